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

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::parser::ValueType;

/// A PromQL aggregation operator. A non-empty `parameter_type` means the
/// operator takes two arguments, the first being the parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "ser", derive(serde::Serialize))]
pub struct AggregateOperator {
    pub name: &'static str,
    pub parameter_type: Option<ValueType>,
}

impl AggregateOperator {
    pub fn new(name: &'static str, parameter_type: Option<ValueType>) -> Self {
        Self {
            name,
            parameter_type,
        }
    }
}

lazy_static! {
    static ref AGGREGATES: HashMap<&'static str, AggregateOperator> = HashMap::from(
        [
            ("sum", None),
            ("avg", None),
            ("count", None),
            ("min", None),
            ("max", None),
            ("group", None),
            ("stddev", None),
            ("stdvar", None),
            ("topk", Some(ValueType::Scalar)),
            ("bottomk", Some(ValueType::Scalar)),
            ("count_values", Some(ValueType::String)),
            ("quantile", Some(ValueType::Scalar)),
        ]
        .map(|(name, parameter_type)| (name, AggregateOperator::new(name, parameter_type)))
    );
}

/// get_aggregate returns the predefined operator for the given name.
/// `name` must already be lowercased.
pub fn get_aggregate(name: &str) -> Option<AggregateOperator> {
    AGGREGATES.get(name).cloned()
}

/// Whether the (lowercased) identifier names an aggregation operator.
pub fn is_aggregate_op(name: &str) -> bool {
    AGGREGATES.contains_key(name)
}
