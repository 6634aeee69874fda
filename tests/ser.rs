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

#![cfg(feature = "ser")]

use promql_syntax::parser::parse;

macro_rules! assert_json_ser_eq {
    ($promql: literal, $json: tt) => {
        let ast = parse($promql).expect("Failed to parse");
        assert_eq!(
            serde_json::json!($json),
            serde_json::to_value(ast).expect("Failed to serialize")
        );
    };
}

#[test]
fn test_serialize_vector_selector() {
    assert_json_ser_eq!(
        r#"up{job="api"}"#,
        {
            "VectorSelector": {
                "metric": { "name": "up" },
                "matchers": {
                    "matchers": [
                        {
                            "name": "job",
                            "op": "Equal",
                            "value": { "quote": "\"", "val": "api" }
                        }
                    ]
                }
            }
        }
    );
}

#[test]
fn test_serialize_matrix_selector() {
    assert_json_ser_eq!(
        "up[5m]",
        {
            "MatrixSelector": {
                "vector_selector": {
                    "metric": { "name": "up" },
                    "matchers": { "matchers": [] }
                },
                "range": { "nanos": 300_000_000_000u64 }
            }
        }
    );
}

#[test]
fn test_serialize_binary() {
    assert_json_ser_eq!(
        "1 < bool 2",
        {
            "Binary": {
                "op": "Lss",
                "lhs": { "NumberLiteral": { "val": 1.0 } },
                "rhs": { "NumberLiteral": { "val": 2.0 } },
                "matching": {
                    "card": "OneToOne",
                    "matching": [],
                    "on": false,
                    "include": [],
                    "return_bool": true
                }
            }
        }
    );
}
