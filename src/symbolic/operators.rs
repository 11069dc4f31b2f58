//! Built-in operator table and interned operator identifiers.
//!
//! Every operator the engine knows out of the box is a variant of [`Builtin`]; the
//! printable name, arity and default binding priority are resolved once from the
//! variant, so evaluation, differentiation and simplification match on the enum
//! rather than on name strings. Operators registered at runtime get an
//! [`OpId::Custom`] slot inside the engine's [`crate::symbolic::registry::Registry`].
use crate::symbolic::expr_tree::Node;
use std::fmt;
use std::sync::Arc;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr)]
pub enum Builtin {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Sub,
    #[strum(serialize = "*")]
    Mul,
    #[strum(serialize = "/")]
    Div,
    /// tuple constructor carrying the arguments of front-form calls
    #[strum(serialize = ",")]
    Comma,
    #[strum(serialize = "pow")]
    Pow,
    #[strum(serialize = "^")]
    Caret,
    /// `log(a, x)`, logarithm of `x` in base `a`
    #[strum(serialize = "log")]
    Log,
    /// `expa(a, x)`, exponential `a^x` with a named base
    #[strum(serialize = "expa")]
    Expa,
    #[strum(serialize = "sin")]
    Sin,
    #[strum(serialize = "cos")]
    Cos,
    #[strum(serialize = "tan")]
    Tan,
    #[strum(serialize = "cot")]
    Cot,
    #[strum(serialize = "sec")]
    Sec,
    #[strum(serialize = "csc")]
    Csc,
    #[strum(serialize = "sinh")]
    Sinh,
    #[strum(serialize = "cosh")]
    Cosh,
    #[strum(serialize = "arcsin")]
    Arcsin,
    #[strum(serialize = "arccos")]
    Arccos,
    #[strum(serialize = "arctan")]
    Arctan,
    #[strum(serialize = "arccot")]
    Arccot,
    #[strum(serialize = "exp")]
    Exp,
    #[strum(serialize = "ln")]
    Ln,
    #[strum(serialize = "sqrt")]
    Sqrt,
    #[strum(serialize = "square")]
    Square,
    #[strum(serialize = "neg")]
    Neg,
    #[strum(serialize = "identity")]
    Identity,
    #[strum(serialize = "fact")]
    Fact,
    /// postfix factorial. It is applied when the operator stack drains, so it only
    /// reads as expected as the last operator of its group: `3!+1` is `(3+1)!`.
    /// Write `(3!)+1` or `fact(3)+1` instead.
    #[strum(serialize = "!")]
    Bang,
}

impl Builtin {
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn arity(self) -> usize {
        use Builtin::*;
        match self {
            Add | Sub | Mul | Div | Comma | Pow | Caret | Log | Expa => 2,
            _ => 1,
        }
    }

    /// Explicit priorities of the default table. `None` means "max registered + 1".
    pub fn default_priority(self) -> Option<f64> {
        match self {
            Builtin::Mul | Builtin::Div => Some(2.0),
            Builtin::Add | Builtin::Sub => Some(1.0),
            Builtin::Comma => Some(0.0),
            _ => None,
        }
    }

    pub fn is_power(self) -> bool {
        matches!(self, Builtin::Pow | Builtin::Caret)
    }

    pub fn is_factorial(self) -> bool {
        matches!(self, Builtin::Fact | Builtin::Bang)
    }
}

/// Interned operator identifier stored in every operator node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OpId {
    Builtin(Builtin),
    /// runtime-registered operator: slot in the engine's custom rule table plus its name
    Custom { slot: usize, name: Arc<str> },
}

impl OpId {
    pub fn name(&self) -> &str {
        match self {
            OpId::Builtin(b) => b.name(),
            OpId::Custom { name, .. } => name,
        }
    }

    pub fn builtin(&self) -> Option<Builtin> {
        match self {
            OpId::Builtin(b) => Some(*b),
            OpId::Custom { .. } => None,
        }
    }

    pub fn is(&self, builtin: Builtin) -> bool {
        self.builtin() == Some(builtin)
    }

    pub fn is_comma(&self) -> bool {
        self.is(Builtin::Comma)
    }

    /// Infix operators are spelled with a single punctuation character (`+`, `^`, `,`);
    /// everything else prints and parses in front form `name(a, b)`.
    pub fn is_infix(&self) -> bool {
        let name = self.name();
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => !c.is_alphanumeric() && c != '_',
            _ => false,
        }
    }
}

impl From<Builtin> for OpId {
    fn from(b: Builtin) -> Self {
        OpId::Builtin(b)
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Numeric rule of a custom operator, receives the resolved operands in order.
pub type EvalRule = Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>;
/// Differentiation rule of a custom operator: raw operand sub-trees and their derivatives
/// with respect to the current variable. `None` reports that no derivative exists.
pub type DiffRule = Arc<dyn Fn(&[&Node], &[Node]) -> Option<Node> + Send + Sync>;

/// Registry entry describing one operator.
#[derive(Clone)]
pub struct OperatorDescriptor {
    pub id: OpId,
    pub arity: usize,
    pub priority: Option<f64>,
    pub eval_rule: Option<EvalRule>,
    pub diff_rule: Option<DiffRule>,
}

impl OperatorDescriptor {
    pub fn builtin(b: Builtin) -> Self {
        OperatorDescriptor {
            id: OpId::Builtin(b),
            arity: b.arity(),
            priority: b.default_priority(),
            eval_rule: None,
            diff_rule: None,
        }
    }
}

impl fmt::Debug for OperatorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorDescriptor")
            .field("id", &self.id)
            .field("arity", &self.arity)
            .field("priority", &self.priority)
            .field("eval_rule", &self.eval_rule.is_some())
            .field("diff_rule", &self.diff_rule.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_names_round_trip() {
        for b in Builtin::iter() {
            assert_eq!(Builtin::from_str(b.name()), Ok(b));
            assert_eq!(b.to_string(), b.name());
        }
        assert_eq!(Builtin::iter().count(), 29);
    }

    #[test]
    fn test_arity_and_priorities() {
        assert_eq!(Builtin::Pow.arity(), 2);
        assert_eq!(Builtin::Bang.arity(), 1);
        assert_eq!(Builtin::Mul.default_priority(), Some(2.0));
        assert_eq!(Builtin::Comma.default_priority(), Some(0.0));
        assert_eq!(Builtin::Sin.default_priority(), None);
        assert!(Builtin::from_str("unknown").is_err());
    }

    #[test]
    fn test_infix_detection() {
        assert!(OpId::from(Builtin::Caret).is_infix());
        assert!(OpId::from(Builtin::Comma).is_infix());
        assert!(!OpId::from(Builtin::Pow).is_infix());
        let custom = OpId::Custom { slot: 0, name: Arc::from("mod") };
        assert!(!custom.is_infix());
        assert_eq!(custom.to_string(), "mod");
    }
}
