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

use std::fmt::{self, Display};

/// The semantic type of a PromQL expression result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub enum ValueType {
    /// No value, e.g. an absent aggregate parameter.
    None,
    /// An instant vector: a set of series sharing one timestamp.
    Vector,
    /// A single number without labels.
    Scalar,
    /// A range vector: a set of series with a range of samples each.
    Matrix,
    /// A string literal.
    String,
}

impl Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ValueType::None => write!(f, "none"),
            ValueType::Scalar => write!(f, "scalar"),
            ValueType::String => write!(f, "string"),
            ValueType::Vector => write!(f, "instant vector"),
            ValueType::Matrix => write!(f, "range vector"),
        }
    }
}

/// Anything that evaluates to a [ValueType].
pub trait Value {
    fn value_type(&self) -> ValueType;
}
