//! elements-admin CLI entrypoint
//! Parses command-line arguments and dispatches to the application use cases.
#![deny(unsafe_code)]

// Internal imports (std, crate)
use elements_admin::{
    analysis::{ResourceAction, SpecAnalyzer},
    application::{
        FormRequest, FormUseCase, GetResourceRequest, GetResourceResponse, GetResourceUseCase,
        ListResourceRequest, ListResourceUseCase, ResourceCatalog, SubmitFormRequest,
    },
    core::Config,
    forms::{FieldSection, FormModel, FormValues, field::display_value, is_empty_value},
    infrastructure::{
        api::{ApiError, ElementsClient, SessionContext},
        openapi::{CachedOpenApiLoader, CompositeOpenApiLoader, HttpOpenApiLoader},
    },
    view::{ListPage, column_header, render_cell},
};
use std::path::PathBuf;
use std::sync::Arc;

// External imports (alphabetized)
use anyhow::Context;
use clap::Parser;
use serde_json::Value as JsonValue;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the session secret
const SESSION_ENV: &str = "ELEMENTS_SESSION_SECRET";

#[derive(Parser)]
#[command(name = "elements-admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Root URL of the Elements backend
    #[arg(long, global = true)]
    backend_url: Option<String>,
    /// Path or URL of the OpenAPI document (YAML or JSON)
    #[arg(long, global = true)]
    schema: Option<String>,
    /// Session secret returned by `login`
    #[arg(long, global = true, env = SESSION_ENV, hide_env_values = true)]
    session: Option<String>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// List the resources found in the OpenAPI document
    Resources {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Open a session and print its secret
    Login {
        #[arg(long)]
        user: String,
        #[arg(long)]
        password: String,
    },
    /// Check that the current session is still valid
    Verify,
    /// Print the backend version
    Version,
    /// Show one page of a resource list
    List {
        resource: String,
        /// Zero-based page index
        #[arg(long, default_value_t = 0)]
        page: u64,
        /// Filter on a query parameter (`name=value`)
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Fetch one record through the resource's single-item GET
    Get {
        resource: String,
        /// Path parameter (`name=value`)
        #[arg(long = "param", value_parser = parse_filter)]
        params: Vec<(String, String)>,
        /// Print JSON instead of a field list
        #[arg(long)]
        json: bool,
    },
    /// Describe the form generated for an operation
    Form {
        resource: String,
        #[command(flatten)]
        target: FormTarget,
        /// Path value selecting the record for --prefill, as `path:name=value`
        #[arg(long = "set", value_parser = parse_assignment)]
        values: Vec<(String, JsonValue)>,
        /// Print JSON instead of a field list
        #[arg(long)]
        json: bool,
    },
    /// Validate form values and send the operation
    Submit {
        resource: String,
        #[command(flatten)]
        target: FormTarget,
        /// Field value as `section:name=value` (section is path, query or body)
        #[arg(long = "set", value_parser = parse_assignment)]
        values: Vec<(String, JsonValue)>,
    },
}

#[derive(clap::Args, Debug)]
pub struct FormTarget {
    /// create, update or delete
    #[arg(long)]
    action: ResourceAction,
    /// Variant index when the resource has several operations for the action
    #[arg(long, default_value_t = 0)]
    variant: usize,
    /// Start from the existing record, fetched with the path values given
    #[arg(long)]
    prefill: bool,
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))?;
    if name.trim().is_empty() {
        return Err(format!("missing parameter name in '{raw}'"));
    }
    Ok((name.trim().to_string(), value.to_string()))
}

/// `section:name=value` into a form key and value.
///
/// JSON arrays and objects are parsed; everything else stays a string and is
/// coerced on submit.
fn parse_assignment(raw: &str) -> Result<(String, JsonValue), String> {
    let (target, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected section:name=value, got '{raw}'"))?;
    let (section, name) = target
        .split_once(':')
        .ok_or_else(|| format!("expected section:name=value, got '{raw}'"))?;
    let section: FieldSection = section.parse()?;
    if name.is_empty() {
        return Err(format!("missing field name in '{raw}'"));
    }

    let trimmed = value.trim_start();
    let value = if trimmed.starts_with('[') || trimmed.starts_with('{') {
        serde_json::from_str(value).map_err(|e| format!("invalid JSON for '{target}': {e}"))?
    } else {
        JsonValue::String(value.to_string())
    };
    Ok((section.key(name), value))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = run(&cli).await;
    if let Err(err) = &result {
        if requires_login(err) {
            error!("Session missing or expired");
            eprintln!(
                "Authentication required: run `elements-admin login` and pass the secret with --session or {SESSION_ENV}"
            );
        }
    }
    result
}

fn requires_login(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<elements_admin::application::ApplicationError>()
            .is_some_and(|e| e.is_auth_required())
            || cause
                .downcast_ref::<ApiError>()
                .is_some_and(ApiError::is_auth_error)
    })
}

/// Services wired from configuration and global flags
struct Services {
    config: Config,
    client: ElementsClient,
    catalog: Arc<ResourceCatalog>,
}

impl Services {
    fn build(cli: &Cli) -> anyhow::Result<Self> {
        let mut config =
            Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
        if let Some(url) = &cli.backend_url {
            config.backend_url = url.clone();
        }
        if let Some(schema) = &cli.schema {
            config.spec_source = Some(schema.clone());
        }
        config.validate().context("Invalid configuration")?;

        let backend_url = config.backend_url().context("Invalid backend URL")?;
        let client = ElementsClient::new(
            backend_url,
            config.api_prefix.clone(),
            config.request_timeout(),
        )
        .context("Failed to build HTTP client")?;

        let loader = CachedOpenApiLoader::new(CompositeOpenApiLoader::new(
            HttpOpenApiLoader::with_client(client.http().clone()),
        ));
        let analyzer = SpecAnalyzer::new(config.pagination.clone());
        let catalog = Arc::new(ResourceCatalog::new(
            Arc::new(loader),
            config.spec_source(),
            analyzer,
        ));

        Ok(Self {
            config,
            client,
            catalog,
        })
    }

    fn list_use_case(&self) -> ListResourceUseCase {
        ListResourceUseCase::new(
            Arc::clone(&self.catalog),
            self.client.clone(),
            self.config.pagination.clone(),
            self.config.columns.clone(),
            self.config.page_size as u64,
        )
    }

    fn get_use_case(&self) -> GetResourceUseCase {
        GetResourceUseCase::new(Arc::clone(&self.catalog), self.client.clone())
    }

    fn form_use_case(&self) -> FormUseCase {
        FormUseCase::new(Arc::clone(&self.catalog), self.client.clone())
    }
}

fn session_from(cli: &Cli) -> anyhow::Result<Option<SessionContext>> {
    cli.session
        .as_deref()
        .map(SessionContext::new)
        .transpose()
        .context("Invalid session secret")
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let services = Services::build(cli)?;
    let session = session_from(cli)?;

    match &cli.command {
        Commands::Resources { json } => run_resources(&services, *json).await?,
        Commands::Login { user, password } => {
            let session = services
                .client
                .login(user, password)
                .await
                .context("Login failed")?;
            println!("{}", session.expose_secret());
        }
        Commands::Verify => {
            let session = session.ok_or(ApiError::AuthRequired)?;
            if session.is_expired() {
                return Err(ApiError::AuthRequired.into());
            }
            let info = services
                .client
                .verify(&session)
                .await
                .context("Session verification failed")?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Commands::Version => {
            println!("{}", services.client.version().await);
        }
        Commands::List {
            resource,
            page,
            filters,
            json,
        } => {
            let request = ListResourceRequest {
                resource: resource.clone(),
                page: *page,
                filters: filters.clone(),
            };
            let page = services
                .list_use_case()
                .execute(request, session.as_ref())
                .await
                .with_context(|| format!("Failed to load {resource}"))?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&page)?);
            } else {
                print_page(&page);
            }
        }
        Commands::Get {
            resource,
            params,
            json,
        } => {
            let request = GetResourceRequest {
                resource: resource.clone(),
                path_params: params.clone(),
            };
            let fetched = services
                .get_use_case()
                .execute(request, session.as_ref())
                .await
                .with_context(|| format!("Failed to fetch {resource}"))?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&fetched)?);
            } else {
                print_record(&fetched)?;
            }
        }
        Commands::Form {
            resource,
            target,
            values,
            json,
        } => {
            let forms = services.form_use_case();
            let request = form_request(resource, target);
            let values: FormValues = values.iter().cloned().collect();
            let initial = prefill(&forms, &request, target, &values, session.as_ref()).await?;
            let model = forms
                .describe(&request, initial.as_ref())
                .await
                .with_context(|| format!("Failed to build form for {resource}"))?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&model)?);
            } else {
                print_form(&model);
            }
        }
        Commands::Submit {
            resource,
            target,
            values,
        } => {
            let forms = services.form_use_case();
            let form = form_request(resource, target);
            let values: FormValues = values.iter().cloned().collect();
            let initial = prefill(&forms, &form, target, &values, session.as_ref()).await?;
            let request = SubmitFormRequest {
                form,
                values,
                initial,
            };
            let response = forms
                .submit(request, session.as_ref())
                .await
                .with_context(|| format!("Failed to submit {} {resource}", target.action))?;
            info!(status = response.status, "Submitted");
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }
    Ok(())
}

fn form_request(resource: &str, target: &FormTarget) -> FormRequest {
    FormRequest {
        resource: resource.to_string(),
        action: target.action,
        variant: target.variant,
    }
}

/// Existing record for `--prefill`, `None` otherwise
async fn prefill(
    forms: &FormUseCase,
    request: &FormRequest,
    target: &FormTarget,
    values: &FormValues,
    session: Option<&SessionContext>,
) -> anyhow::Result<Option<JsonValue>> {
    if !target.prefill {
        return Ok(None);
    }
    let record = forms
        .fetch_initial(request, values, session)
        .await
        .with_context(|| format!("Failed to fetch the {} record to edit", request.resource))?;
    Ok(Some(record))
}

async fn run_resources(services: &Services, json: bool) -> anyhow::Result<()> {
    let catalog = services
        .catalog
        .load()
        .await
        .context("Failed to load OpenAPI document")?;
    let summaries = catalog.summaries();

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }
    if summaries.is_empty() {
        println!("No resources found in {}", services.catalog.source());
        return Ok(());
    }

    let headers = ["Resource", "Path", "List", "Get", "Create", "Update", "Delete"]
        .map(String::from)
        .to_vec();
    let rows = summaries
        .iter()
        .map(|s| {
            vec![
                s.display_name.clone(),
                s.base_path.clone(),
                match (s.list, s.paginated) {
                    (true, true) => "paged".to_string(),
                    (true, false) => "yes".to_string(),
                    _ => "-".to_string(),
                },
                if s.get { "yes" } else { "-" }.to_string(),
                s.create.to_string(),
                s.update.to_string(),
                s.delete.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    print_table(&headers, &rows);
    Ok(())
}

fn print_page(page: &ListPage) {
    println!("{}", page.display_name);
    if let Some(raw) = &page.raw {
        println!("{raw}");
        return;
    }
    if page.rows.is_empty() {
        println!("No {} found", page.display_name.to_lowercase());
        return;
    }

    print_table(&page.headers(), &page.table());
    if let Some((first, last)) = page.range() {
        println!(
            "\nShowing {first} to {last} of {} (page {} of {})",
            page.total,
            page.page.saturating_add(1),
            page.total_pages.max(1)
        );
    }
}

fn print_record(fetched: &GetResourceResponse) -> anyhow::Result<()> {
    match (&fetched.record, &fetched.raw) {
        (Some(JsonValue::Object(fields)), _) => {
            let headers = ["Field", "Value"].map(String::from).to_vec();
            let rows = fields
                .iter()
                .map(|(name, value)| vec![column_header(name), render_cell(Some(value))])
                .collect::<Vec<_>>();
            print_table(&headers, &rows);
        }
        (Some(other), _) => println!("{}", serde_json::to_string_pretty(other)?),
        (None, Some(raw)) => println!("{raw}"),
        (None, None) => println!("{} returned no content", fetched.path),
    }
    Ok(())
}

fn print_form(model: &FormModel) {
    for section in [FieldSection::Path, FieldSection::Query, FieldSection::Body] {
        let fields: Vec<_> = model.fields_in(section).collect();
        if fields.is_empty() {
            continue;
        }
        println!("[{}]", section.prefix().trim_matches('_'));
        for field in fields {
            let marker = if field.required { "*" } else { " " };
            print!("{marker} {} ({:?})", field.label, field.kind);
            if !field.options.is_empty() {
                let options: Vec<_> = field.options.iter().map(display_value).collect();
                print!(" [{}]", options.join(", "));
            }
            if let Some(placeholder) = &field.placeholder {
                print!(" - {placeholder}");
            }
            if !is_empty_value(Some(&field.default)) {
                print!(" = {}", display_value(&field.default));
            }
            println!();
        }
    }
}

fn print_table(headers: &[String], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };
    println!("{}", line(headers));
    println!(
        "{}",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  ")
    );
    for row in rows {
        println!("{}", line(row));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_filter() {
        assert_eq!(
            parse_filter("search=bob=1").unwrap(),
            ("search".to_string(), "bob=1".to_string())
        );
        assert!(parse_filter("search").is_err());
        assert!(parse_filter("=x").is_err());
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("path:name=alice").unwrap(),
            ("__path_name".to_string(), json!("alice"))
        );
        assert_eq!(
            parse_assignment("body:tags=[\"a\",\"b\"]").unwrap(),
            ("__body_tags".to_string(), json!(["a", "b"]))
        );
        assert_eq!(
            parse_assignment("query:count=5").unwrap(),
            ("__query_count".to_string(), json!("5"))
        );
        assert!(parse_assignment("header:x=1").is_err());
        assert!(parse_assignment("body=1").is_err());
    }

    #[test]
    fn test_cli_parses_list() {
        let cli = Cli::try_parse_from([
            "elements-admin",
            "--backend-url",
            "http://backend:8080",
            "list",
            "user",
            "--page",
            "2",
            "--filter",
            "search=bob",
        ])
        .unwrap();
        assert_eq!(cli.backend_url.as_deref(), Some("http://backend:8080"));
        match cli.command {
            Commands::List {
                resource,
                page,
                filters,
                json,
            } => {
                assert_eq!(resource, "user");
                assert_eq!(page, 2);
                assert_eq!(filters, vec![("search".to_string(), "bob".to_string())]);
                assert!(!json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parses_get() {
        let cli =
            Cli::try_parse_from(["elements-admin", "get", "user", "--param", "name=bob"]).unwrap();
        match cli.command {
            Commands::Get {
                resource, params, ..
            } => {
                assert_eq!(resource, "user");
                assert_eq!(params, vec![("name".to_string(), "bob".to_string())]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parses_prefilled_form() {
        let cli = Cli::try_parse_from([
            "elements-admin",
            "form",
            "user",
            "--action",
            "update",
            "--prefill",
            "--set",
            "path:name=bob",
        ])
        .unwrap();
        match cli.command {
            Commands::Form { target, values, .. } => {
                assert!(target.prefill);
                assert_eq!(values, vec![("__path_name".to_string(), json!("bob"))]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parses_submit() {
        let cli = Cli::try_parse_from([
            "elements-admin",
            "submit",
            "user",
            "--action",
            "update",
            "--variant",
            "1",
            "--set",
            "path:name=alice",
            "--set",
            "body:password=secret",
        ])
        .unwrap();
        match cli.command {
            Commands::Submit {
                target, values, ..
            } => {
                assert_eq!(target.action, ResourceAction::Update);
                assert_eq!(target.variant, 1);
                assert!(!target.prefill);
                assert_eq!(values.len(), 2);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
