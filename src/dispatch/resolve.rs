//! dispatch::resolve
//!
//! Turns a module name and method name into an [`Invocable`].
//!
//! # Resolution Steps
//!
//! 1. Find the code unit in the registry (`ModuleNotFound` otherwise)
//! 2. Run the unit's load hook, once per process (`Load` on failure)
//! 3. Find the method on the entry type (`MethodNotImplemented` otherwise)
//! 4. Constructed entry types only: check the constructor's required
//!    parameters (`MissingArguments`), then construct (`Construction`)
//!
//! Method lookup happens before construction so a misspelled method never
//! triggers constructor side effects.

use std::fmt;

use serde_json::Value;

use super::params::ParameterSet;
use super::registry::{BoundCall, CodeUnit, EntryPoint, Registry};
use super::task::{StaticFn, TaskContext, TaskError};
use super::validate::check_supplied;
use super::DispatchError;
use crate::core::types::Arguments;

/// A resolved method, not yet validated.
///
/// The only way to call it is through [`super::ReadyCall`], which
/// [`super::validate()`] returns.
pub struct Invocable {
    module: &'static str,
    entry_type: &'static str,
    method: &'static str,
    required: ParameterSet,
    target: Target,
}

enum Target {
    /// Called on the unconstructed entry type.
    Static(StaticFn),
    /// Bound to a constructed instance.
    Bound(BoundCall),
}

impl Invocable {
    /// Module the method was resolved from.
    pub fn module(&self) -> &'static str {
        self.module
    }

    /// Entry type name.
    pub fn entry_type(&self) -> &'static str {
        self.entry_type
    }

    /// Method name.
    pub fn method(&self) -> &'static str {
        self.method
    }

    /// Parameters the method requires.
    pub fn required(&self) -> ParameterSet {
        self.required
    }

    /// True if bound to a constructed instance.
    pub fn is_bound(&self) -> bool {
        matches!(self.target, Target::Bound(_))
    }

    /// `EntryType.method`, for diagnostics.
    pub fn target_name(&self) -> String {
        format!("{}.{}", self.entry_type, self.method)
    }

    pub(super) fn call(&self, args: &Arguments, ctx: &TaskContext) -> Result<Value, TaskError> {
        match &self.target {
            Target::Static(call) => call(args, ctx),
            Target::Bound(call) => call(args, ctx),
        }
    }
}

impl fmt::Debug for Invocable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocable")
            .field("module", &self.module)
            .field("target", &self.target_name())
            .field("required", &self.required.names())
            .field("bound", &self.is_bound())
            .finish()
    }
}

/// Resolve `method` on the code unit registered as `module`.
///
/// `args` is the full argument mapping (secrets included); constructed
/// entry types receive it in their constructor.
///
/// # Errors
///
/// See the module documentation for which step raises which error.
pub fn resolve(
    registry: &Registry,
    module: &str,
    method: &str,
    args: &Arguments,
) -> Result<Invocable, DispatchError> {
    tracing::info!("Importing {} from source root", module);

    let unit = registry
        .get(module)
        .ok_or_else(|| DispatchError::ModuleNotFound {
            module: module.to_string(),
            available: registry.modules().map(String::from).collect(),
        })?;

    unit.ensure_loaded()
        .map_err(|error| DispatchError::Load {
            module: unit.module().to_string(),
            error,
        })?;

    match &unit.entry {
        EntryPoint::Static { methods } => {
            let found = methods
                .iter()
                .find(|m| m.name == method)
                .ok_or_else(|| not_implemented(unit, method))?;

            Ok(Invocable {
                module: unit.module(),
                entry_type: unit.entry_type(),
                method: found.name,
                required: found.required,
                target: Target::Static(found.call),
            })
        }
        EntryPoint::Constructed {
            required,
            lookup,
            bind,
        } => {
            let (name, method_required) =
                lookup(method).ok_or_else(|| not_implemented(unit, method))?;

            check_supplied(required, args, || format!("{} constructor", unit.entry_type()))?;

            tracing::debug!("Constructing {}", unit.entry_type());
            let bound = bind(args, name)
                .map_err(|error| DispatchError::Construction {
                    entry_type: unit.entry_type().to_string(),
                    error,
                })?
                .ok_or_else(|| not_implemented(unit, method))?;

            Ok(Invocable {
                module: unit.module(),
                entry_type: unit.entry_type(),
                method: name,
                required: method_required,
                target: Target::Bound(bound),
            })
        }
    }
}

fn not_implemented(unit: &CodeUnit, method: &str) -> DispatchError {
    DispatchError::MethodNotImplemented {
        method: method.to_string(),
        module: unit.module().to_string(),
        available: unit.method_names().iter().map(|m| m.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::dispatch::task::{arg_str, ConstructedTask, Method, StaticMethod, StaticTask, TaskUnit};
    use crate::dispatch::validate;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // -------------------------------------------------------------------------
    // Fixture units
    // -------------------------------------------------------------------------

    struct Adder;

    impl TaskUnit for Adder {
        const MODULE: &'static str = "adder";
        const ENTRY_TYPE: &'static str = "Adder";
    }

    impl StaticTask for Adder {
        const METHODS: &'static [StaticMethod] = &[StaticMethod {
            name: "add",
            required: ParameterSet::new(&["a", "b"]),
            call: add,
        }];
    }

    fn add(args: &Arguments, _ctx: &TaskContext) -> Result<Value, TaskError> {
        let a = crate::dispatch::arg_f64(args, "a")?;
        let b = crate::dispatch::arg_f64(args, "b")?;
        Ok(json!(a + b))
    }

    static GREETER_CONSTRUCTIONS: AtomicUsize = AtomicUsize::new(0);

    struct GreeterTask {
        greeting: String,
    }

    impl TaskUnit for GreeterTask {
        const MODULE: &'static str = "greeter_task";
        const ENTRY_TYPE: &'static str = "GreeterTask";
    }

    impl ConstructedTask for GreeterTask {
        const REQUIRED: ParameterSet = ParameterSet::new(&["greeting"]);
        const METHODS: &'static [Method<Self>] = &[
            Method {
                name: "greet",
                required: ParameterSet::new(&["name"]),
                call: GreeterTask::greet,
            },
            Method {
                name: "has_secrets",
                required: ParameterSet::new(&["secrets"]),
                call: |_, args, _| Ok(json!(args.contains("secrets"))),
            },
        ];

        fn construct(args: &Arguments) -> Result<Self, TaskError> {
            GREETER_CONSTRUCTIONS.fetch_add(1, Ordering::SeqCst);
            let greeting = arg_str(args, "greeting")?;
            if greeting.is_empty() {
                return Err(TaskError::invalid("greeting", "cannot be empty"));
            }
            Ok(Self {
                greeting: greeting.to_string(),
            })
        }
    }

    impl GreeterTask {
        fn greet(&self, args: &Arguments, _ctx: &TaskContext) -> Result<Value, TaskError> {
            Ok(json!(format!("{}, {}", self.greeting, arg_str(args, "name")?)))
        }
    }

    struct Broken;

    impl TaskUnit for Broken {
        const MODULE: &'static str = "broken";
        const ENTRY_TYPE: &'static str = "Broken";

        fn load() -> Result<(), TaskError> {
            Err(TaskError::failed("No module named 'psycopg'"))
        }
    }

    impl StaticTask for Broken {
        const METHODS: &'static [StaticMethod] = &[];
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register(CodeUnit::from_static::<Adder>()).unwrap();
        registry
            .register(CodeUnit::from_constructed::<GreeterTask>())
            .unwrap();
        registry.register(CodeUnit::from_static::<Broken>()).unwrap();
        registry
    }

    fn args(value: Value) -> Arguments {
        Arguments::try_from(value).unwrap()
    }

    fn ctx() -> TaskContext {
        TaskContext::from_config(&Config::default())
    }

    // -------------------------------------------------------------------------
    // Tests
    // -------------------------------------------------------------------------

    mod static_units {
        use super::*;

        #[test]
        fn resolves_and_invokes() {
            let registry = registry();
            let a = args(json!({"a": 1, "b": 2}));
            let invocable = resolve(&registry, "adder", "add", &a).unwrap();

            assert_eq!(invocable.module(), "adder");
            assert_eq!(invocable.entry_type(), "Adder");
            assert_eq!(invocable.method(), "add");
            assert!(!invocable.is_bound());

            let ready = validate(invocable, &a).unwrap();
            assert_eq!(ready.invoke(&a, &ctx()).unwrap(), json!(3.0));
        }

        #[test]
        fn missing_method() {
            let registry = registry();
            let err = resolve(&registry, "adder", "subtract", &Arguments::new()).unwrap_err();
            match err {
                DispatchError::MethodNotImplemented {
                    method,
                    module,
                    available,
                } => {
                    assert_eq!(method, "subtract");
                    assert_eq!(module, "adder");
                    assert_eq!(available, vec!["add"]);
                }
                other => panic!("unexpected error: {:?}", other),
            }
        }

        #[test]
        fn validation_reports_missing_parameter() {
            let registry = registry();
            let a = args(json!({"a": 1}));
            let invocable = resolve(&registry, "adder", "add", &a).unwrap();
            let err = validate(invocable, &a).unwrap_err();
            assert_eq!(
                err,
                DispatchError::MissingArguments {
                    target: "Adder.add".into(),
                    missing: vec!["b".into()],
                }
            );
        }

        #[test]
        fn ready_call_carries_resolved_target() {
            let registry = registry();
            let a = args(json!({"a": 4, "b": 5}));
            let ready = validate(resolve(&registry, "adder", "add", &a).unwrap(), &a).unwrap();

            assert_eq!(ready.invocable().target_name(), "Adder.add");
            assert_eq!(ready.invocable().required().names(), &["a", "b"]);
            assert_eq!(ready.invoke(&a, &ctx()).unwrap(), json!(9.0));
        }
    }

    mod constructed_units {
        use super::*;

        #[test]
        fn resolves_bound_method() {
            let registry = registry();
            let a = args(json!({"greeting": "Hello", "name": "Ada"}));
            let invocable = resolve(&registry, "greeter_task", "greet", &a).unwrap();

            assert!(invocable.is_bound());
            assert_eq!(invocable.target_name(), "GreeterTask.greet");
            let ready = validate(invocable, &a).unwrap();
            assert_eq!(ready.invoke(&a, &ctx()).unwrap(), json!("Hello, Ada"));
        }

        #[test]
        fn constructor_requirements_checked_before_construction() {
            let registry = registry();
            let before = GREETER_CONSTRUCTIONS.load(Ordering::SeqCst);
            let err = resolve(&registry, "greeter_task", "greet", &args(json!({"name": "Ada"})))
                .unwrap_err();

            assert_eq!(
                err,
                DispatchError::MissingArguments {
                    target: "GreeterTask constructor".into(),
                    missing: vec!["greeting".into()],
                }
            );
            assert_eq!(GREETER_CONSTRUCTIONS.load(Ordering::SeqCst), before);
        }

        #[test]
        fn unknown_method_does_not_construct() {
            let registry = registry();
            let before = GREETER_CONSTRUCTIONS.load(Ordering::SeqCst);
            let err = resolve(
                &registry,
                "greeter_task",
                "wave",
                &args(json!({"greeting": "Hi"})),
            )
            .unwrap_err();

            assert!(matches!(err, DispatchError::MethodNotImplemented { .. }));
            assert_eq!(GREETER_CONSTRUCTIONS.load(Ordering::SeqCst), before);
        }

        #[test]
        fn constructor_failure_surfaces() {
            let registry = registry();
            let err = resolve(
                &registry,
                "greeter_task",
                "greet",
                &args(json!({"greeting": ""})),
            )
            .unwrap_err();
            assert_eq!(
                err,
                DispatchError::Construction {
                    entry_type: "GreeterTask".into(),
                    error: TaskError::invalid("greeting", "cannot be empty"),
                }
            );
        }

        #[test]
        fn secrets_requirement_tolerated_without_physical_key() {
            let registry = registry();
            let a = args(json!({"greeting": "Hi"}));
            let invocable = resolve(&registry, "greeter_task", "has_secrets", &a).unwrap();
            let ready = validate(invocable, &a).unwrap();
            assert_eq!(ready.invoke(&a, &ctx()).unwrap(), json!(false));
        }
    }

    mod module_resolution {
        use super::*;

        #[test]
        fn unknown_module_lists_available() {
            let registry = registry();
            let err = resolve(&registry, "ghost", "run", &Arguments::new()).unwrap_err();
            match &err {
                DispatchError::ModuleNotFound { module, available } => {
                    assert_eq!(module, "ghost");
                    assert_eq!(available, &vec!["adder", "broken", "greeter_task"]);
                }
                other => panic!("unexpected error: {:?}", other),
            }
            assert!(!err.to_string().contains("psycopg"));
        }

        #[test]
        fn load_failure_is_distinct_and_verbatim() {
            let registry = registry();
            let err = resolve(&registry, "broken", "run", &Arguments::new()).unwrap_err();
            assert!(matches!(err, DispatchError::Load { .. }));
            assert_eq!(err.to_string(), "No module named 'psycopg'");
        }

        #[test]
        fn load_failure_is_sticky() {
            let registry = registry();
            let first = resolve(&registry, "broken", "run", &Arguments::new()).unwrap_err();
            let second = resolve(&registry, "broken", "run", &Arguments::new()).unwrap_err();
            assert_eq!(first, second);
        }
    }
}
