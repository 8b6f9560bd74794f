//! units::sql_task
//!
//! Query unit. Constructed around the caller's `sql` argument, which arrives
//! already normalized (double quotes rewritten to single quotes).
//!
//! # Methods
//!
//! - `render` - the query as the unit will run it
//! - `preview(limit)` - the query with a row limit, written to the file
//!   artifact so downstream tasks can pick it up

use serde_json::{json, Value};

use crate::codec::SQL_KEY;
use crate::core::types::Arguments;
use crate::dispatch::{
    arg_str, arg_u64, ConstructedTask, Method, ParameterSet, TaskContext, TaskError, TaskUnit,
};

/// Entry type of the `sql_task` module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlTask {
    sql: String,
}

impl TaskUnit for SqlTask {
    const MODULE: &'static str = "sql_task";
    const ENTRY_TYPE: &'static str = "SqlTask";
}

impl ConstructedTask for SqlTask {
    const REQUIRED: ParameterSet = ParameterSet::new(&[SQL_KEY]);

    const METHODS: &'static [Method<Self>] = &[
        Method {
            name: "render",
            required: ParameterSet::EMPTY,
            call: SqlTask::render,
        },
        Method {
            name: "preview",
            required: ParameterSet::new(&["limit"]),
            call: SqlTask::preview,
        },
    ];

    fn construct(args: &Arguments) -> Result<Self, TaskError> {
        let sql = arg_str(args, SQL_KEY)?.trim();
        if sql.is_empty() {
            return Err(TaskError::invalid(SQL_KEY, "query cannot be empty"));
        }
        Ok(Self {
            sql: sql.trim_end_matches(';').trim_end().to_string(),
        })
    }
}

impl SqlTask {
    /// The query text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    fn render(&self, _args: &Arguments, _ctx: &TaskContext) -> Result<Value, TaskError> {
        Ok(json!(self.sql))
    }

    fn preview(&self, args: &Arguments, ctx: &TaskContext) -> Result<Value, TaskError> {
        let limit = arg_u64(args, "limit")?;
        if limit == 0 {
            return Err(TaskError::invalid("limit", "must be at least 1"));
        }

        let value = json!({
            "query": format!("{} LIMIT {}", self.sql, limit),
            "limit": limit,
        });
        ctx.publisher().write(&value)?;
        Ok(value)
    }
}
