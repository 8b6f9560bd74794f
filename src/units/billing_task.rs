//! units::billing_task
//!
//! Invoice computation for a single account.

use serde::Serialize;
use serde_json::Value;

use crate::core::types::Arguments;
use crate::dispatch::{
    arg_f64, arg_str, arg_u64, ConstructedTask, Method, ParameterSet, TaskContext, TaskError,
    TaskUnit,
};

/// Currency used when the caller does not pass one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Entry type of the `billing_task` module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingTask {
    account_id: String,
    currency: String,
}

/// Result of `invoice`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Invoice {
    pub account_id: String,
    pub currency: String,
    pub amount: f64,
    pub quantity: u64,
    pub total: f64,
}

impl TaskUnit for BillingTask {
    const MODULE: &'static str = "billing_task";
    const ENTRY_TYPE: &'static str = "BillingTask";
}

impl ConstructedTask for BillingTask {
    const REQUIRED: ParameterSet = ParameterSet::new(&["account_id"]);

    const METHODS: &'static [Method<Self>] = &[Method {
        name: "invoice",
        required: ParameterSet::new(&["amount", "quantity"]),
        call: BillingTask::invoice,
    }];

    fn construct(args: &Arguments) -> Result<Self, TaskError> {
        let account_id = arg_str(args, "account_id")?;
        if account_id.is_empty() {
            return Err(TaskError::invalid("account_id", "cannot be empty"));
        }

        let currency = match args.get("currency") {
            None => DEFAULT_CURRENCY.to_string(),
            Some(_) => parse_currency(arg_str(args, "currency")?)?,
        };

        Ok(Self {
            account_id: account_id.to_string(),
            currency,
        })
    }
}

impl BillingTask {
    /// Account being billed.
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Invoice currency code.
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Price a line item.
    pub fn price(&self, amount: f64, quantity: u64) -> Result<Invoice, TaskError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(TaskError::invalid("amount", "must be a non-negative number"));
        }
        Ok(Invoice {
            account_id: self.account_id.clone(),
            currency: self.currency.clone(),
            amount,
            quantity,
            total: amount * quantity as f64,
        })
    }

    fn invoice(&self, args: &Arguments, _ctx: &TaskContext) -> Result<Value, TaskError> {
        let amount = arg_f64(args, "amount")?;
        let quantity = arg_u64(args, "quantity")?;
        let invoice = self.price(amount, quantity)?;

        tracing::info!(
            account = %invoice.account_id,
            total = invoice.total,
            "Invoice computed"
        );
        serde_json::to_value(invoice).map_err(|e| TaskError::failed(e.to_string()))
    }
}

/// Three-letter uppercase ISO 4217 style code.
fn parse_currency(raw: &str) -> Result<String, TaskError> {
    let code = raw.trim().to_ascii_uppercase();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code)
    } else {
        Err(TaskError::invalid(
            "currency",
            format!("'{}' is not a three-letter currency code", raw),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Arguments {
        Arguments::try_from(value).unwrap()
    }

    #[test]
    fn currency_defaults_to_usd() {
        let task = BillingTask::construct(&args(json!({"account_id": "acct-9"}))).unwrap();
        assert_eq!(task.account_id(), "acct-9");
        assert_eq!(task.currency(), "USD");
    }

    #[test]
    fn currency_normalized() {
        let task =
            BillingTask::construct(&args(json!({"account_id": "a", "currency": " eur "}))).unwrap();
        assert_eq!(task.currency(), "EUR");
    }

    #[test]
    fn invalid_currency_rejected() {
        for bad in [json!("EURO"), json!("U$D"), json!(978)] {
            let result = BillingTask::construct(&args(json!({"account_id": "a", "currency": bad})));
            assert!(result.is_err());
        }
    }

    #[test]
    fn empty_account_rejected() {
        let err = BillingTask::construct(&args(json!({"account_id": ""}))).unwrap_err();
        assert_eq!(err, TaskError::invalid("account_id", "cannot be empty"));
    }

    #[test]
    fn price_computes_total() {
        let task = BillingTask::construct(&args(json!({"account_id": "a"}))).unwrap();
        let invoice = task.price(12.5, 3).unwrap();
        assert_eq!(invoice.total, 37.5);
        assert_eq!(invoice.quantity, 3);
    }

    #[test]
    fn negative_amount_rejected() {
        let task = BillingTask::construct(&args(json!({"account_id": "a"}))).unwrap();
        assert!(task.price(-0.01, 1).is_err());
    }

    #[test]
    fn invoice_value_shape() {
        let task = BillingTask::construct(&args(json!({"account_id": "a"}))).unwrap();
        let ctx = TaskContext::from_config(&crate::core::config::Config::default());
        let value = task
            .invoice(&args(json!({"amount": 2, "quantity": 5})), &ctx)
            .unwrap();
        assert_eq!(
            value,
            json!({
                "account_id": "a",
                "currency": "USD",
                "amount": 2.0,
                "quantity": 5,
                "total": 10.0,
            })
        );
    }
}
