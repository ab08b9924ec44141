//! Control locators
//!
//! A locator is a conjunction of predicates over widget tree nodes:
//!
//! ```text
//! Type=ElevatedButton && Description~=Submit
//! ```
//!
//! `=` compares exactly, `~=` matches a substring. Values may be wrapped in
//! single or double quotes.

use std::fmt;
use std::str::FromStr;

use fprobe_core::prelude::*;
use fprobe_core::DiagnosticsNode;

const CONJUNCTION: &str = "&&";

/// Node attribute a predicate looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorField {
    /// Widget class name, see [`DiagnosticsNode::widget_type`]
    Type,
    Description,
    Name,
    ValueId,
}

impl LocatorField {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "Type" => Some(Self::Type),
            "Description" => Some(Self::Description),
            "Name" => Some(Self::Name),
            "ValueId" => Some(Self::ValueId),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Type => "Type",
            Self::Description => "Description",
            Self::Name => "Name",
            Self::ValueId => "ValueId",
        }
    }

    fn value_of<'a>(&self, node: &'a DiagnosticsNode) -> &'a str {
        match self {
            Self::Type => node.widget_type(),
            Self::Description => &node.description,
            Self::Name => node.name.as_deref().unwrap_or_default(),
            Self::ValueId => node.value_id.as_deref().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOp {
    Equals,
    Contains,
}

/// One `Field=Value` or `Field~=Value` term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub field: LocatorField,
    pub op: MatchOp,
    pub value: String,
}

impl Predicate {
    pub fn matches(&self, node: &DiagnosticsNode) -> bool {
        let actual = self.field.value_of(node);
        match self.op {
            MatchOp::Equals => actual == self.value,
            MatchOp::Contains => actual.contains(&self.value),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.op {
            MatchOp::Equals => "=",
            MatchOp::Contains => "~=",
        };
        write!(f, "{}{}{}", self.field.as_str(), op, self.value)
    }
}

/// A parsed locator: every predicate must match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    predicates: Vec<Predicate>,
}

impl Locator {
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Whether `node` itself satisfies every predicate.
    pub fn matches(&self, node: &DiagnosticsNode) -> bool {
        self.predicates.iter().all(|p| p.matches(node))
    }

    /// Every matching node of `root`'s subtree, depth-first.
    pub fn find_all<'a>(&self, root: &'a DiagnosticsNode) -> Vec<&'a DiagnosticsNode> {
        let mut found = Vec::new();
        root.walk(&mut |node| {
            if self.matches(node) {
                found.push(node);
            }
        });
        found
    }
}

impl FromStr for Locator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Err(Error::invalid_locator(s, "empty locator"));
        }

        let predicates = s
            .split(CONJUNCTION)
            .map(|term| parse_predicate(s, term.trim()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { predicates })
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, predicate) in self.predicates.iter().enumerate() {
            if i > 0 {
                write!(f, " {CONJUNCTION} ")?;
            }
            write!(f, "{predicate}")?;
        }
        Ok(())
    }
}

fn parse_predicate(locator: &str, term: &str) -> Result<Predicate> {
    let (field, op, value) = if let Some((field, value)) = term.split_once("~=") {
        (field, MatchOp::Contains, value)
    } else if let Some((field, value)) = term.split_once('=') {
        (field, MatchOp::Equals, value)
    } else {
        return Err(Error::invalid_locator(
            locator,
            format!("'{term}' is not Field=Value or Field~=Value"),
        ));
    };

    let field = LocatorField::parse(field.trim()).ok_or_else(|| {
        Error::invalid_locator(
            locator,
            format!("unknown field '{}', expected Type, Description, Name or ValueId", field.trim()),
        )
    })?;

    Ok(Predicate {
        field,
        op,
        value: unquote(value.trim()).to_string(),
    })
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}
