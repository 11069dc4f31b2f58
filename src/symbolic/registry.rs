//! Operator and bracket registries.
//!
//! The default operator table is immutable and shared by every engine. Each engine
//! owns a [`Registry`] holding an override layer on top of it: custom operators,
//! priority overrides and extra bracket pairs. Lookups consult the override layer
//! first and fall back to the defaults.
use crate::symbolic::errors::AlgebraError;
use crate::symbolic::operators::{Builtin, DiffRule, EvalRule, OpId, OperatorDescriptor};
use log::debug;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use strum::IntoEnumIterator;

static DEFAULT_OPERATORS: LazyLock<HashMap<&'static str, Builtin>> =
    LazyLock::new(|| Builtin::iter().map(|b| (b.name(), b)).collect());

/// Closing marker -> opening marker.
#[derive(Debug, Clone, PartialEq)]
pub struct BracketRegistry {
    pairs: HashMap<String, String>,
}

impl Default for BracketRegistry {
    fn default() -> Self {
        let mut pairs = HashMap::new();
        pairs.insert(")".to_string(), "(".to_string());
        BracketRegistry { pairs }
    }
}

impl BracketRegistry {
    pub fn register(&mut self, open: &str, close: &str) {
        self.pairs.insert(close.to_string(), open.to_string());
    }

    /// opening marker matching a closing marker
    pub fn opener_of(&self, close: &str) -> Option<&str> {
        self.pairs.get(close).map(String::as_str)
    }

    pub fn is_opener(&self, text: &str) -> bool {
        self.pairs.values().any(|open| open == text)
    }

    pub fn is_closer(&self, text: &str) -> bool {
        self.pairs.contains_key(text)
    }

    pub fn is_marker(&self, text: &str) -> bool {
        self.is_closer(text) || self.is_opener(text)
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(close, open)| (open.as_str(), close.as_str()))
    }
}

/// Per-engine operator registry.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    /// runtime-registered operators by name, consulted before the defaults
    overrides: HashMap<String, OperatorDescriptor>,
    /// custom descriptors by slot, the slot is stored in [`OpId::Custom`]
    custom: Vec<OperatorDescriptor>,
    priorities: HashMap<String, f64>,
    pub brackets: BracketRegistry,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves an operator name to its identifier.
    pub fn lookup(&self, name: &str) -> Option<OpId> {
        if let Some(descriptor) = self.overrides.get(name) {
            return Some(descriptor.id.clone());
        }
        DEFAULT_OPERATORS.get(name).map(|b| OpId::Builtin(*b))
    }

    pub fn is_operator(&self, name: &str) -> bool {
        self.overrides.contains_key(name) || DEFAULT_OPERATORS.contains_key(name)
    }

    pub fn arity(&self, id: &OpId) -> usize {
        match id {
            OpId::Builtin(b) => b.arity(),
            OpId::Custom { slot, .. } => self.custom.get(*slot).map(|d| d.arity).unwrap_or(2),
        }
    }

    pub fn descriptor(&self, id: &OpId) -> Option<OperatorDescriptor> {
        match id {
            OpId::Builtin(b) => Some(OperatorDescriptor::builtin(*b)),
            OpId::Custom { slot, .. } => self.custom.get(*slot).cloned(),
        }
    }

    pub fn eval_rule(&self, id: &OpId) -> Option<&EvalRule> {
        match id {
            OpId::Custom { slot, .. } => self.custom.get(*slot).and_then(|d| d.eval_rule.as_ref()),
            OpId::Builtin(_) => None,
        }
    }

    pub fn diff_rule(&self, id: &OpId) -> Option<&DiffRule> {
        match id {
            OpId::Custom { slot, .. } => self.custom.get(*slot).and_then(|d| d.diff_rule.as_ref()),
            OpId::Builtin(_) => None,
        }
    }

    /// Registers a custom operator, shadowing a built-in of the same name.
    /// Only unary and binary operators can be registered.
    pub fn register_operator(
        &mut self,
        name: &str,
        arity: usize,
        priority: Option<f64>,
        eval_rule: Option<EvalRule>,
        diff_rule: Option<DiffRule>,
    ) -> Result<OpId, AlgebraError> {
        if !(1..=2).contains(&arity) {
            return Err(AlgebraError::Config(format!(
                "operator `{}` has arity {}, only 1 and 2 are supported",
                name, arity
            )));
        }
        let slot = match self.overrides.get(name) {
            Some(OperatorDescriptor { id: OpId::Custom { slot, .. }, .. }) => *slot,
            _ => self.custom.len(),
        };
        let id = OpId::Custom { slot, name: Arc::from(name) };
        let descriptor = OperatorDescriptor {
            id: id.clone(),
            arity,
            priority,
            eval_rule,
            diff_rule,
        };
        if slot == self.custom.len() {
            self.custom.push(descriptor.clone());
        } else {
            self.custom[slot] = descriptor.clone();
        }
        self.overrides.insert(name.to_string(), descriptor);
        match priority {
            Some(p) => {
                self.priorities.insert(name.to_string(), p);
            }
            None => {
                self.priorities.remove(name);
            }
        }
        debug!("registered operator {} arity {} priority {:?}", name, arity, priority);
        Ok(id)
    }

    pub fn set_priority(&mut self, name: &str, priority: f64) {
        self.priorities.insert(name.to_string(), priority);
    }

    pub fn register_bracket(&mut self, open: &str, close: &str) {
        self.brackets.register(open, close);
    }

    fn explicit_priority(&self, name: &str) -> Option<f64> {
        if let Some(p) = self.priorities.get(name) {
            return Some(*p);
        }
        if self.overrides.contains_key(name) {
            return None;
        }
        DEFAULT_OPERATORS.get(name).and_then(|b| b.default_priority())
    }

    /// Highest explicitly registered priority across defaults and overrides.
    pub fn max_priority(&self) -> f64 {
        DEFAULT_OPERATORS
            .keys()
            .filter_map(|name| self.explicit_priority(name))
            .chain(self.priorities.values().copied())
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Priority of `name`, operators without an explicit one bind tighter than all others.
    pub fn priority_of(&self, name: &str) -> f64 {
        self.explicit_priority(name)
            .unwrap_or_else(|| self.max_priority() + 1.0)
    }

    /// Negative when `right` binds tighter than `left`.
    pub fn compare(&self, left: &str, right: &str) -> Ordering {
        let fallback = self.max_priority() + 1.0;
        let l = self.explicit_priority(left).unwrap_or(fallback);
        let r = self.explicit_priority(right).unwrap_or(fallback);
        l.total_cmp(&r)
    }
}
