//! create command - Create a container

use clap::Args;
use sel_core::ContainerType;
use serde::Serialize;

use super::{Context, fail};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Create a container. An existing container is not an error.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Container name
    pub name: String,

    /// Create a private container instead of a public one
    #[arg(long)]
    pub private: bool,
}

#[derive(Debug, Serialize)]
struct CreateOutput {
    status: &'static str,
    container: String,
    #[serde(rename = "type")]
    container_type: ContainerType,
}

/// Execute the create command
pub async fn execute(args: CreateArgs, ctx: Context, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let client = match ctx.connect(&formatter).await {
        Ok(c) => c,
        Err(code) => return code,
    };

    if let Err(e) = client.create_container(&args.name, args.private).await {
        return fail(
            &formatter,
            &format!("Failed to create container '{}'", args.name),
            &e,
        );
    }

    if formatter.is_json() {
        formatter.json(&CreateOutput {
            status: "success",
            container: args.name,
            container_type: ContainerType::from_private(args.private),
        });
    } else {
        formatter.success(&format!(
            "Created container {}",
            formatter.style_name(&args.name)
        ));
    }

    ExitCode::Success
}
