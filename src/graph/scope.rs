//! Explicit graph-builder context
//!
//! Variable creation goes through a [`GraphBuilder`] passed to every
//! layer-construction call. The builder carries the current scope path, the
//! variable registry, the reuse policy governing registry hits, and the RNG
//! used for initialization and dropout masks. There is no global state.

use std::collections::HashMap;

use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::Tensor;
use crate::error::{Error, Result};

/// What happens when a variable path is already registered (or isn't)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReusePolicy {
    /// Creating an already-registered path is a configuration error
    #[default]
    CreateOnly,
    /// Only registered paths may be requested; a miss is a configuration
    /// error
    Reuse,
    /// Reuse registered paths, create missing ones
    ReuseOrCreate,
}

/// Variable initialization schemes
#[derive(Debug, Clone, Copy)]
pub enum Init {
    Zeros,
    Constant(f32),
    /// Uniform over ±sqrt(6 / (fan_in + fan_out))
    XavierUniform { fan_in: usize, fan_out: usize },
}

/// Scope-aware variable registry and builder state
pub struct GraphBuilder {
    path: Vec<String>,
    vars: HashMap<String, Tensor>,
    reuse: ReusePolicy,
    rng: StdRng,
}

impl GraphBuilder {
    /// Create a builder with thread-derived randomness
    pub fn new() -> Self {
        Self::with_seed(rand::thread_rng().gen())
    }

    /// Create a builder with deterministic randomness
    pub fn with_seed(seed: u64) -> Self {
        Self {
            path: Vec::new(),
            vars: HashMap::new(),
            reuse: ReusePolicy::default(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Set the reuse policy for subsequent variable requests
    pub fn set_reuse_policy(&mut self, policy: ReusePolicy) {
        self.reuse = policy;
    }

    /// Run `f` with `name` pushed onto the scope path
    pub fn scope<R>(&mut self, name: &str, f: impl FnOnce(&mut Self) -> R) -> R {
        self.path.push(name.to_string());
        let result = f(self);
        self.path.pop();
        result
    }

    /// The current slash-joined scope path
    pub fn current_scope(&self) -> String {
        self.path.join("/")
    }

    fn full_path(&self, name: &str) -> String {
        if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}/{name}", self.path.join("/"))
        }
    }

    /// Fetch or create the variable `name` under the current scope.
    ///
    /// Variables are created with `requires_grad` set; hits and misses are
    /// resolved according to the reuse policy.
    pub fn variable(&mut self, name: &str, len: usize, init: Init) -> Result<Tensor> {
        let key = self.full_path(name);

        if let Some(existing) = self.vars.get(&key) {
            return match self.reuse {
                ReusePolicy::CreateOnly => Err(Error::Config(format!(
                    "variable {key:?} already exists and the reuse policy forbids sharing"
                ))),
                ReusePolicy::Reuse | ReusePolicy::ReuseOrCreate => Ok(existing.clone()),
            };
        }

        if self.reuse == ReusePolicy::Reuse {
            return Err(Error::Config(format!(
                "variable {key:?} not found under a reuse-only policy"
            )));
        }

        let data = match init {
            Init::Zeros => Array1::zeros(len),
            Init::Constant(c) => Array1::from_elem(len, c),
            Init::XavierUniform { fan_in, fan_out } => {
                let limit = (6.0 / (fan_in + fan_out) as f32).sqrt();
                Array1::from_iter((0..len).map(|_| self.rng.gen_range(-limit..limit)))
            }
        };
        let tensor = Tensor::new(data, true);
        self.vars.insert(key, tensor.clone());
        Ok(tensor)
    }

    /// Look up a registered variable by its full path
    pub fn get(&self, full_path: &str) -> Option<&Tensor> {
        self.vars.get(full_path)
    }

    /// All registered variable paths
    pub fn variable_paths(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    pub(crate) fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
