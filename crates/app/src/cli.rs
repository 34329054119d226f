//! Command line definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use postgen_domain::generation::{AttributeType, MappingSource, SpecialToken};
use postgen_domain::{HttpMethod, LeafAddress};

/// Edit Postman collections and generate filtered requests from a template.
#[derive(Parser, Debug)]
#[command(name = "postgen", author, version, about, long_about = None)]
pub struct Cli {
    /// JSON config file; `POSTGEN_*` variables override it.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Work on a local collections directory instead of the collection service.
    #[arg(long, global = true, value_name = "DIR")]
    pub file_store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the editable requests of a collection.
    List {
        /// Collection id.
        collection: String,
    },

    /// Change a request and save the collection.
    Edit {
        /// Collection id.
        collection: String,
        #[command(flatten)]
        address: AddressArgs,
        #[command(flatten)]
        changes: EditArgs,
        /// Apply the change without saving.
        #[arg(long)]
        dry_run: bool,
    },

    /// Duplicate a request next to itself and save the collection.
    Clone {
        /// Collection id.
        collection: String,
        #[command(flatten)]
        address: AddressArgs,
        /// Apply the change without saving.
        #[arg(long)]
        dry_run: bool,
    },

    /// Remove a request and save the collection.
    Delete {
        /// Collection id.
        collection: String,
        #[command(flatten)]
        address: AddressArgs,
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
        /// Apply the change without saving.
        #[arg(long)]
        dry_run: bool,
    },

    /// Show how many requests a generation would produce, and its payload.
    Plan {
        /// Collection id.
        collection: String,
        #[command(flatten)]
        address: AddressArgs,
        #[command(flatten)]
        generation: GenerationArgs,
        /// Print the service payload as well.
        #[arg(long)]
        payload: bool,
    },

    /// Generate filtered requests into the collection.
    Generate {
        /// Collection id.
        collection: String,
        #[command(flatten)]
        address: AddressArgs,
        #[command(flatten)]
        generation: GenerationArgs,
    },
}

/// Identifies a request by folder, method and name.
#[derive(Args, Debug, Clone)]
pub struct AddressArgs {
    /// Request name.
    pub name: String,

    /// Request method.
    #[arg(short = 'X', long, value_parser = parse_method)]
    pub method: HttpMethod,

    /// Immediate parent folder; omit for root-level requests.
    #[arg(long, default_value = "")]
    pub folder: String,
}

impl AddressArgs {
    /// The leaf address these arguments name.
    #[must_use]
    pub fn address(&self) -> LeafAddress {
        LeafAddress::new(self.folder.clone(), self.name.clone(), self.method)
    }
}

/// Fields to change; anything not given keeps its current value.
#[derive(Args, Debug, Clone, Default)]
pub struct EditArgs {
    /// New method.
    #[arg(long, value_parser = parse_method)]
    pub set_method: Option<HttpMethod>,

    /// New raw URL.
    #[arg(long)]
    pub url: Option<String>,

    /// Headers as a JSON array of `{"key", "value"}` objects.
    #[arg(long)]
    pub headers: Option<String>,

    /// New body text; JSON is tagged as a JSON body.
    #[arg(long, conflicts_with = "no_body")]
    pub body: Option<String>,

    /// Remove the body.
    #[arg(long)]
    pub no_body: bool,

    /// New description; an empty value clears it.
    #[arg(long)]
    pub description: Option<String>,
}

/// Options shared by `plan` and `generate`.
#[derive(Args, Debug, Clone, Default)]
pub struct GenerationArgs {
    /// Object type label for the generated requests.
    #[arg(long, default_value = "")]
    pub object_type: String,

    /// Response sample file; defaults to the template's saved response.
    #[arg(long, value_name = "FILE")]
    pub sample: Option<PathBuf>,

    /// Extra attribute, as `PATH:TYPE` or `PATH:TYPE:nullable`.
    #[arg(long = "custom-attribute", value_parser = parse_custom_attribute)]
    pub custom_attributes: Vec<CustomAttributeArg>,

    /// Extra condition for an attribute, as `ATTRIBUTE=TOKEN`.
    #[arg(long = "custom-condition", value_parser = parse_assignment)]
    pub custom_conditions: Vec<(String, String)>,

    /// Only generate these conditions, as `ATTRIBUTE=KEY[,KEY...]`.
    #[arg(long = "select", value_parser = parse_assignment)]
    pub selections: Vec<(String, String)>,

    /// Body field mapping, as `FIELD=response:PATH`, `FIELD=manual:VALUE`,
    /// `FIELD=special:TOKEN` or `FIELD=none`.
    #[arg(long = "map", value_parser = parse_mapping)]
    pub mappings: Vec<(String, MappingSource)>,
}

/// A `--custom-attribute` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomAttributeArg {
    /// Dotted attribute path.
    pub path: String,
    /// Declared type.
    pub attr_type: AttributeType,
    /// Whether the attribute may be null.
    pub nullable: bool,
}

fn parse_method(value: &str) -> Result<HttpMethod, String> {
    value.parse().map_err(|e: postgen_domain::DomainError| e.to_string())
}

fn parse_assignment(value: &str) -> Result<(String, String), String> {
    let (key, rest) = value
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{value}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing name before `=` in `{value}`"));
    }
    Ok((key.to_string(), rest.to_string()))
}

fn parse_custom_attribute(value: &str) -> Result<CustomAttributeArg, String> {
    let mut parts = value.split(':');
    let path = parts.next().unwrap_or_default().trim();
    let type_name = parts
        .next()
        .ok_or_else(|| format!("expected PATH:TYPE, got `{value}`"))?;
    let nullable = match parts.next() {
        None => false,
        Some("nullable") => true,
        Some(other) => return Err(format!("unknown attribute flag `{other}`")),
    };
    if path.is_empty() {
        return Err("attribute path is empty".to_string());
    }
    Ok(CustomAttributeArg {
        path: path.to_string(),
        attr_type: AttributeType::from_schema(type_name, None),
        nullable,
    })
}

fn parse_mapping(value: &str) -> Result<(String, MappingSource), String> {
    let (field, source) = parse_assignment(value)?;
    let source = match source.split_once(':') {
        None if source == "none" => MappingSource::Unmapped,
        Some(("response", path)) => MappingSource::ResponseAttribute(path.to_string()),
        Some(("manual", text)) => MappingSource::Manual(text.to_string()),
        Some(("special", token)) => MappingSource::Special(
            token
                .parse::<SpecialToken>()
                .map_err(|_| format!("unknown special token `{token}`"))?,
        ),
        _ => return Err(format!("unknown mapping `{source}`")),
    };
    Ok((field, source))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_clone_in_folder() {
        let cli = Cli::try_parse_from([
            "postgen", "--file-store", "/srv/c", "clone", "petstore", "login", "-X", "post",
            "--folder", "Auth",
        ])
        .unwrap();

        assert_eq!(cli.file_store, Some(PathBuf::from("/srv/c")));
        let Command::Clone { collection, address, dry_run } = cli.command else {
            panic!("expected clone");
        };
        assert_eq!(collection, "petstore");
        assert_eq!(address.address(), LeafAddress::new("Auth", "login", HttpMethod::Post));
        assert!(!dry_run);
    }

    #[test]
    fn test_root_address_defaults_to_empty_folder() {
        let cli = Cli::try_parse_from(["postgen", "delete", "petstore", "ping", "-X", "GET", "--yes"])
            .unwrap();
        let Command::Delete { address, yes, .. } = cli.command else {
            panic!("expected delete");
        };
        assert!(address.address().is_root());
        assert!(yes);
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        let result = Cli::try_parse_from(["postgen", "clone", "petstore", "ping", "-X", "FETCH"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_generation_options() {
        let cli = Cli::try_parse_from([
            "postgen",
            "plan",
            "petstore",
            "create pet",
            "-X",
            "POST",
            "--object-type",
            "Pet",
            "--custom-attribute",
            "owner.age:int64:nullable",
            "--custom-condition",
            "name=STARTS_WITH",
            "--select",
            "name=EQ,NEQ",
            "--map",
            "name=response:name",
            "--map",
            "kind=special:objectType",
            "--map",
            "note=manual:hello:world",
        ])
        .unwrap();

        let Command::Plan { generation, .. } = cli.command else {
            panic!("expected plan");
        };
        assert_eq!(generation.object_type, "Pet");
        assert_eq!(
            generation.custom_attributes,
            vec![CustomAttributeArg {
                path: "owner.age".into(),
                attr_type: AttributeType::Integer,
                nullable: true,
            }]
        );
        assert_eq!(generation.custom_conditions, vec![("name".into(), "STARTS_WITH".into())]);
        assert_eq!(generation.selections, vec![("name".into(), "EQ,NEQ".into())]);
        assert_eq!(
            generation.mappings,
            vec![
                ("name".into(), MappingSource::ResponseAttribute("name".into())),
                ("kind".into(), MappingSource::Special(SpecialToken::ObjectType)),
                ("note".into(), MappingSource::Manual("hello:world".into())),
            ]
        );
    }

    #[test]
    fn test_bad_mapping_is_rejected() {
        assert!(parse_mapping("name").is_err());
        assert!(parse_mapping("name=special:nope").is_err());
        assert_eq!(parse_mapping("name=none").unwrap().1, MappingSource::Unmapped);
    }
}
