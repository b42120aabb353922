use anyhow::{Context, Result};

use crate::{Client, Frontend};

/// Assembles a [`Client`] from a built runtime and a frontend.
#[derive(Default)]
pub struct ClientBuilder {
    runtime: Option<runtime::Runtime>,
    frontend: Option<Box<dyn Frontend>>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn runtime(mut self, runtime: runtime::Runtime) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// The frontend is handed a [`runtime::RuntimeHandle`] once `run` starts.
    pub fn frontend(mut self, frontend: impl Frontend + 'static) -> Self {
        self.frontend = Some(Box::new(frontend));
        self
    }

    pub fn build(self) -> Result<Client> {
        let runtime = self.runtime.context("a runtime is required")?;
        let frontend = self.frontend.context("a frontend is required")?;

        Ok(Client { runtime, frontend })
    }
}
