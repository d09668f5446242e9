//! CloudFormation fragment for the IAM principal the gateway invokes functions with.
//!
//! The fragment is static template text for the caller to merge into its own
//! infrastructure template; nothing here talks to AWS.

use serde_json::{Value, json};

use crate::descriptor::FunctionEventDeclaration;
use crate::outputs::{ACCESS_KEY_OUTPUT, SECRET_KEY_OUTPUT, normalized_function_name};

pub const USER_RESOURCE: &str = "EventGatewayUser";
pub const POLICY_RESOURCE: &str = "EventGatewayUserPolicy";
pub const KEYS_RESOURCE: &str = "EventGatewayUserKeys";

/// `Resources` and `Outputs` granting invoke on every function with gateway bindings.
pub fn template_fragment(declarations: &[FunctionEventDeclaration]) -> Value {
    let function_arns: Vec<Value> = declarations
        .iter()
        .filter(|d| !d.bindings.is_empty())
        .map(|d| {
            json!({
                "Fn::GetAtt": [
                    format!("{}LambdaFunction", normalized_function_name(&d.function)),
                    "Arn"
                ]
            })
        })
        .collect();

    let mut resources = json!({
        USER_RESOURCE: {
            "Type": "AWS::IAM::User"
        },
        KEYS_RESOURCE: {
            "Type": "AWS::IAM::AccessKey",
            "Properties": {
                "UserName": { "Ref": USER_RESOURCE }
            }
        }
    });

    // IAM rejects a policy statement with an empty resource list.
    if !function_arns.is_empty()
        && let Some(map) = resources.as_object_mut()
    {
        map.insert(
            POLICY_RESOURCE.to_string(),
            json!({
                "Type": "AWS::IAM::ManagedPolicy",
                "Properties": {
                    "Users": [{ "Ref": USER_RESOURCE }],
                    "PolicyDocument": {
                        "Version": "2012-10-17",
                        "Statement": [{
                            "Effect": "Allow",
                            "Action": ["lambda:InvokeFunction"],
                            "Resource": function_arns
                        }]
                    }
                }
            }),
        );
    }

    json!({
        "Resources": resources,
        "Outputs": {
            ACCESS_KEY_OUTPUT: {
                "Value": { "Ref": KEYS_RESOURCE }
            },
            SECRET_KEY_OUTPUT: {
                "Value": { "Fn::GetAtt": [KEYS_RESOURCE, "SecretAccessKey"] }
            }
        }
    })
}
