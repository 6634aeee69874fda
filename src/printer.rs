// Copyright 2023 Greptime Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Canonical single-line PromQL rendering of the AST.
//!
//! `expr.to_string()` of any parsed expression parses back to a
//! structurally equal tree. Comments, whitespace and the written position
//! of the `bool` modifier are not preserved.

use std::fmt::{self, Display};

use crate::parser::{
    AggregateExpr, BinaryExpr, Call, Expr, MatrixSelector, NumberLiteral, OffsetExpr, ParenExpr,
    StringLiteral, SubqueryExpr, UnaryExpr, VectorMatchCardinality, VectorMatching,
    VectorSelector,
};
use crate::util::{float, string};

impl Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Aggregate(e) => write!(f, "{e}"),
            Expr::Unary(e) => write!(f, "{e}"),
            Expr::Binary(e) => write!(f, "{e}"),
            Expr::Paren(e) => write!(f, "{e}"),
            Expr::Subquery(e) => write!(f, "{e}"),
            Expr::Offset(e) => write!(f, "{e}"),
            Expr::NumberLiteral(e) => write!(f, "{e}"),
            Expr::StringLiteral(e) => write!(f, "{e}"),
            Expr::VectorSelector(e) => write!(f, "{e}"),
            Expr::MatrixSelector(e) => write!(f, "{e}"),
            Expr::Call(e) => write!(f, "{e}"),
        }
    }
}

impl Display for NumberLiteral {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", float::display_f64(self.val))
    }
}

impl Display for StringLiteral {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", string::quote_string(self.quote, &self.val))
    }
}

impl Display for VectorSelector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(metric) = &self.metric {
            write!(f, "{}", metric.name)?;
        }
        if !self.matchers.is_empty() || self.metric.is_none() {
            write!(f, "{}", self.matchers)?;
        }
        Ok(())
    }
}

impl Display for MatrixSelector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}[{}]", self.vector_selector, self.range)
    }
}

impl Display for SubqueryExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}[{}:", self.expr, self.range)?;
        if let Some(step) = &self.step {
            write!(f, "{step}")?;
        }
        write!(f, "]")
    }
}

impl Display for OffsetExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} offset {}", self.expr, self.offset)
    }
}

impl Display for ParenExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({})", self.expr)
    }
}

impl Display for UnaryExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.op, self.expr)
    }
}

impl Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}(", self.func.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")
    }
}

impl Display for AggregateExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.op.name)?;
        if self.without {
            write!(f, " without ({})", self.grouping.join(", "))?;
        } else if !self.grouping.is_empty() {
            write!(f, " by ({})", self.grouping.join(", "))?;
        }
        if self.without || !self.grouping.is_empty() {
            write!(f, " ")?;
        }
        write!(f, "(")?;
        if let Some(param) = &self.param {
            write!(f, "{param}, ")?;
        }
        write!(f, "{})", self.expr)
    }
}

impl Display for BinaryExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} ", self.lhs, self.op)?;
        if let Some(matching) = &self.matching {
            if !matching.is_default() {
                write!(f, "{matching} ")?;
            }
        }
        write!(f, "{}", self.rhs)
    }
}

// `bool`, the on/ignoring clause and the group modifier, in that order,
// regardless of where the bool modifier was written.
impl Display for VectorMatching {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut sep = "";
        if self.return_bool {
            write!(f, "bool")?;
            sep = " ";
        }
        if self.on || !self.matching.is_empty() {
            let clause = if self.on { "on" } else { "ignoring" };
            write!(f, "{sep}{clause} ({})", self.matching.join(", "))?;
            sep = " ";
        }
        match self.card {
            VectorMatchCardinality::OneToOne => {}
            VectorMatchCardinality::ManyToOne => write!(f, "{sep}group_left")?,
            VectorMatchCardinality::OneToMany => write!(f, "{sep}group_right")?,
        }
        if !self.include.is_empty() {
            write!(f, " ({})", self.include.join(", "))?;
        }
        Ok(())
    }
}
