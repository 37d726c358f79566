//! Structural checks over Java submissions.
//!
//! Submissions are lexed into a flat token stream first. Comments vanish and
//! string/char literals collapse into an opaque [`Token::Literal`], so rule
//! text hidden inside either can never satisfy a rule. Each rule is a
//! [`Construct`] that renders to an expected token sequence which must occur
//! contiguously in the submission.

mod lexer;
mod rules;

pub use lexer::{Token, tokenize};
pub use rules::{Construct, Param, Rule, RuleReport, evaluate};
