#[cfg(test)]
pub mod test {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::args::ArgSource;
    use crate::error::BoxError;
    use crate::value::{Table, table_from_toml};

    /// Parse a TOML literal into a table.
    pub fn table(toml_str: &str) -> Table {
        table_from_toml(toml_str).unwrap()
    }

    /// Shared fetch counter handed out by [`StubArgs::new`].
    #[derive(Clone, Default)]
    pub struct CallCount(Arc<AtomicUsize>);

    impl CallCount {
        pub fn get(&self) -> usize {
            self.0.load(Ordering::SeqCst)
        }
    }

    /// Argument source returning a fixed table and counting how often it is asked.
    pub struct StubArgs {
        args: Table,
        calls: CallCount,
    }

    impl StubArgs {
        pub fn new(toml_str: &str) -> (Self, CallCount) {
            let calls = CallCount::default();
            let stub = StubArgs {
                args: table(toml_str),
                calls: calls.clone(),
            };
            (stub, calls)
        }
    }

    impl ArgSource for StubArgs {
        fn fetch(&self) -> Result<Table, BoxError> {
            self.calls.0.fetch_add(1, Ordering::SeqCst);
            Ok(self.args.clone())
        }
    }

    /// Argument source that always fails.
    pub struct BrokenArgs;

    impl ArgSource for BrokenArgs {
        fn fetch(&self) -> Result<Table, BoxError> {
            Err("argv unavailable".into())
        }
    }

    /// The baseline used by the merge scenarios.
    pub fn defaults() -> Table {
        table(
            r#"
            name = "shane"
            numbers = [1, 2, 3]
            log = true

            [user]
            email = "shane@gmail.com"
            password = "123456"

            [mode.level1]
            type = "cat"
            "#,
        )
    }

    #[test]
    fn defaults_fixture_parses() {
        let d = defaults();
        assert_eq!(d["name"].as_str(), Some("shane"));
        assert_eq!(d["numbers"].as_array().unwrap().len(), 3);
        assert!(d["user"].as_table().is_some());
    }
}
