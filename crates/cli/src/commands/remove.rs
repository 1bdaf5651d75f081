//! remove command - Remove an object or a container

use clap::{Args, ValueEnum};
use sel_core::{Error, StorageApi};
use serde::Serialize;

use super::{Context, fail, not_enough};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

const USAGE: &str = "selctl remove [-t object|container] [--force] [container] [object]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RemoveType {
    Object,
    Container,
}

/// Remove an object or a container
#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// What a single positional argument names
    #[arg(short = 't', long = "type", value_enum, default_value_t = RemoveType::Object)]
    pub kind: RemoveType,

    /// Remove every object of a non-empty container first
    #[arg(short, long)]
    pub force: bool,

    /// `[container] [object]`
    #[arg(num_args = 1..=2, required = true)]
    pub args: Vec<String>,
}

#[derive(Debug, PartialEq, Eq)]
enum Target {
    Container(String),
    Object(String, String),
}

#[derive(Debug, Serialize)]
struct RemoveOutput {
    status: &'static str,
    container: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    object: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    objects_removed: Option<usize>,
}

fn resolve(kind: RemoveType, args: &[String], default: Option<&str>) -> Option<Target> {
    let target = match (kind, args) {
        (_, [container, object]) => Target::Object(container.clone(), object.clone()),
        (RemoveType::Container, [container]) => Target::Container(container.clone()),
        (RemoveType::Object, [object]) => Target::Object(default?.to_string(), object.clone()),
        _ => return None,
    };
    match &target {
        Target::Container(c) | Target::Object(c, _) if c.is_empty() => None,
        _ => Some(target),
    }
}

/// Execute the remove command
pub async fn execute(args: RemoveArgs, ctx: Context, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let Some(target) = resolve(args.kind, &args.args, ctx.default_container()) else {
        return not_enough(&formatter, USAGE);
    };

    let client = match ctx.connect(&formatter).await {
        Ok(c) => c,
        Err(code) => return code,
    };

    match target {
        Target::Object(container, object) => {
            if let Err(e) = client.object(&container, &object).remove().await {
                return fail(
                    &formatter,
                    &format!("Failed to remove '{container}/{object}'"),
                    &e,
                );
            }
            if formatter.is_json() {
                formatter.json(&RemoveOutput {
                    status: "success",
                    container,
                    object: Some(object),
                    objects_removed: None,
                });
            } else {
                formatter.success(&format!(
                    "Removed {} from {}",
                    formatter.style_name(&object),
                    formatter.style_name(&container)
                ));
            }
        }
        Target::Container(container) => {
            let removed = match remove_container(&client, &container, args.force, &formatter).await
            {
                Ok(n) => n,
                Err(e) => {
                    return fail(
                        &formatter,
                        &format!("Failed to remove container '{container}'"),
                        &e,
                    );
                }
            };
            if formatter.is_json() {
                formatter.json(&RemoveOutput {
                    status: "success",
                    container,
                    object: None,
                    objects_removed: args.force.then_some(removed),
                });
            } else {
                formatter.success(&format!(
                    "Removed container {}",
                    formatter.style_name(&container)
                ));
            }
        }
    }

    ExitCode::Success
}

/// Remove a container, emptying it first when `force` is set.
///
/// Objects that vanish while emptying are skipped. Returns how many objects
/// were removed.
async fn remove_container<S: StorageApi + ?Sized>(
    api: &S,
    name: &str,
    force: bool,
    formatter: &Formatter,
) -> Result<usize, Error> {
    match api.remove_container(name).await {
        Ok(()) => return Ok(0),
        Err(Error::ContainerNotEmpty(_)) if force => {}
        Err(e) => return Err(e),
    }

    formatter.warning(&format!("Removing all objects of {name}"));
    let mut removed = 0;
    for object in api.objects_info(name).await? {
        match api.remove_object(name, &object.name).await {
            Ok(()) => removed += 1,
            Err(Error::ObjectNotFound(_)) => {
                tracing::debug!(container = name, object = %object.name, "Object already gone");
            }
            Err(e) => return Err(e),
        }
    }

    api.remove_container(name).await?;
    Ok(removed)
}
