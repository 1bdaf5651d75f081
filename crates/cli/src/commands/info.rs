//! info command - Show account, container or object details

use clap::{Args, ValueEnum};
use sel_core::{ContainerInfo, ObjectInfo, StorageInformation};

use super::{Context, fail, not_enough};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

const USAGE: &str = "selctl info [-t storage|container|object] [container] [object]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InfoType {
    Storage,
    Container,
    Object,
}

/// Print information about the storage, a container or an object
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// What to describe
    #[arg(short = 't', long = "type", value_enum, default_value_t = InfoType::Storage)]
    pub kind: InfoType,

    /// `[container]` for containers, `[container] <object>` for objects
    #[arg(num_args = 0..=2)]
    pub args: Vec<String>,
}

#[derive(Debug, PartialEq, Eq)]
enum Target {
    Storage,
    Container(String),
    Object(String, String),
}

/// Decide what to describe. Any positional argument means an object unless
/// `--type container` was given.
fn resolve(kind: InfoType, args: &[String], default: Option<&str>) -> Option<Target> {
    match (kind, args) {
        (InfoType::Container, [name, ..]) => Some(Target::Container(name.clone())),
        (InfoType::Container, []) => default.map(|c| Target::Container(c.to_string())),
        (InfoType::Storage, []) => Some(Target::Storage),
        (InfoType::Object, []) => None,
        (_, rest) => super::container_and_item(rest, default).map(|(c, o)| Target::Object(c, o)),
    }
}

/// Execute the info command
pub async fn execute(args: InfoArgs, ctx: Context, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let Some(target) = resolve(args.kind, &args.args, ctx.default_container()) else {
        return not_enough(&formatter, USAGE);
    };

    let client = match ctx.connect(&formatter).await {
        Ok(c) => c,
        Err(code) => return code,
    };

    match target {
        Target::Storage => match client.info().await {
            Ok(info) => print_storage(&formatter, &info),
            Err(e) => return fail(&formatter, "Failed to get storage info", &e),
        },
        Target::Container(name) => match client.container(&name).info().await {
            Ok(info) => print_container(&formatter, &info),
            Err(e) => return fail(&formatter, &format!("Failed to get container '{name}'"), &e),
        },
        Target::Object(container, name) => {
            let object = client.object(&container, &name);
            match object.info().await {
                Ok(info) => {
                    let url = object.url().await.unwrap_or_default();
                    print_object(&formatter, &container, &url, &info);
                }
                Err(e) => {
                    return fail(
                        &formatter,
                        &format!("Failed to get object '{container}/{name}'"),
                        &e,
                    );
                }
            }
        }
    }

    ExitCode::Success
}

fn human(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

fn print_storage(formatter: &Formatter, info: &StorageInformation) {
    if formatter.is_json() {
        formatter.json(info);
        return;
    }
    formatter.property("Containers:", &info.container_count.to_string(), 12);
    formatter.property("Objects:", &info.object_count.to_string(), 12);
    formatter.property("Used:", &formatter.style_size(&human(info.bytes_used)), 12);
    formatter.property("Received:", &formatter.style_size(&human(info.received_bytes)), 12);
    formatter.property(
        "Sent:",
        &formatter.style_size(&human(info.transferred_bytes)),
        12,
    );
}

fn print_container(formatter: &Formatter, info: &ContainerInfo) {
    if formatter.is_json() {
        formatter.json(info);
        return;
    }
    formatter.property("Name:", &formatter.style_name(&info.name), 10);
    formatter.property("Type:", info.container_type.as_str(), 10);
    formatter.property("Objects:", &info.object_count.to_string(), 10);
    formatter.property("Used:", &formatter.style_size(&human(info.bytes_used)), 10);
    formatter.property("Received:", &formatter.style_size(&human(info.received_bytes)), 10);
    formatter.property(
        "Sent:",
        &formatter.style_size(&human(info.transferred_bytes)),
        10,
    );
}

fn print_object(formatter: &Formatter, container: &str, url: &str, info: &ObjectInfo) {
    if formatter.is_json() {
        formatter.json(info);
        return;
    }
    formatter.property("Name:", &formatter.style_name(&info.name), 11);
    formatter.property("Container:", container, 11);
    formatter.property("Size:", &formatter.style_size(&human(info.size)), 11);
    formatter.property("Type:", &info.content_type, 11);
    formatter.property("Hash:", &info.hash, 11);
    formatter.property(
        "Modified:",
        &formatter.style_date(&info.last_modified.to_string()),
        11,
    );
    formatter.property("Downloads:", &info.downloaded.to_string(), 11);
    formatter.property("URL:", &formatter.style_url(url), 11);
}
