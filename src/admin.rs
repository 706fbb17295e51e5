use anyhow::{anyhow, Context, Result};
use tracing::info;
use url::Url;

use crate::db::models::ReferenceImageInsert;
use crate::handlers::analyze_reference::run_reference_analysis;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    IssueSession {
        user_id: String,
        ttl_hours: Option<i64>,
    },
    RegisterReference {
        user_id: String,
        image_url: String,
        file_name: String,
        file_size: i64,
    },
    Analyze {
        user_id: String,
        reference_image_id: String,
    },
}

pub fn admin_usage() -> &'static str {
    "Usage:\n  sellerhood-style-service issue-session --user-id <id> [--ttl-hours <n>]\n  sellerhood-style-service register-reference --user-id <id> --url <image-url> [--file-name <name>] [--file-size <bytes>]\n  sellerhood-style-service analyze --user-id <id> --reference-image-id <id>"
}

fn take_value<'a>(args: &'a [String], index: &mut usize, flag: &str) -> Result<&'a str> {
    *index += 1;
    args.get(*index)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("Missing value for {flag}"))
}

fn required(value: Option<String>, flag: &str) -> Result<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| anyhow!("{flag} is required\n{}", admin_usage()))
}

fn validate_image_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|err| anyhow!("Invalid --url value {raw}: {err}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(anyhow!("Unsupported --url scheme: {other}")),
    }
}

fn file_name_from_url(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .unwrap_or("reference-image")
        .to_string()
}

/// Returns `Ok(None)` when the first argument is not an admin subcommand, so
/// the caller falls through to serving HTTP.
pub fn parse_admin_args(args: &[String]) -> Result<Option<AdminCommand>> {
    let Some(subcommand) = args.get(1).map(String::as_str) else {
        return Ok(None);
    };
    if !matches!(subcommand, "issue-session" | "register-reference" | "analyze") {
        return Ok(None);
    }

    let mut user_id = None;
    let mut ttl_hours = None;
    let mut image_url = None;
    let mut file_name = None;
    let mut file_size = 0_i64;
    let mut reference_image_id = None;

    let mut index = 2;
    while index < args.len() {
        match (subcommand, args[index].as_str()) {
            (_, "--user-id") => {
                user_id = Some(take_value(args, &mut index, "--user-id")?.to_string());
            }
            ("issue-session", "--ttl-hours") => {
                let value = take_value(args, &mut index, "--ttl-hours")?;
                let hours = value
                    .parse::<i64>()
                    .map_err(|_| anyhow!("Invalid --ttl-hours value: {value}"))?;
                if hours <= 0 {
                    return Err(anyhow!("--ttl-hours must be positive"));
                }
                ttl_hours = Some(hours);
            }
            ("register-reference", "--url") => {
                image_url = Some(take_value(args, &mut index, "--url")?.to_string());
            }
            ("register-reference", "--file-name") => {
                file_name = Some(take_value(args, &mut index, "--file-name")?.to_string());
            }
            ("register-reference", "--file-size") => {
                let value = take_value(args, &mut index, "--file-size")?;
                file_size = value
                    .parse::<i64>()
                    .ok()
                    .filter(|size| *size >= 0)
                    .ok_or_else(|| anyhow!("Invalid --file-size value: {value}"))?;
            }
            ("analyze", "--reference-image-id") => {
                reference_image_id =
                    Some(take_value(args, &mut index, "--reference-image-id")?.to_string());
            }
            (_, "--help" | "-h") => {
                return Err(anyhow!(admin_usage()));
            }
            (_, other) => {
                return Err(anyhow!(
                    "Unknown {subcommand} argument: {other}\n{}",
                    admin_usage()
                ));
            }
        }
        index += 1;
    }

    let user_id = required(user_id, "--user-id")?;
    let command = match subcommand {
        "issue-session" => AdminCommand::IssueSession { user_id, ttl_hours },
        "register-reference" => {
            let url = validate_image_url(&required(image_url, "--url")?)?;
            let file_name = file_name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| file_name_from_url(&url));
            AdminCommand::RegisterReference {
                user_id,
                image_url: url.to_string(),
                file_name,
                file_size,
            }
        }
        _ => AdminCommand::Analyze {
            user_id,
            reference_image_id: required(reference_image_id, "--reference-image-id")?,
        },
    };
    Ok(Some(command))
}

/// Runs one admin command and prints its result to stdout.
pub async fn run_admin_command(command: AdminCommand, state: &AppState) -> Result<()> {
    let db = &state.db;
    match command {
        AdminCommand::IssueSession { user_id, ttl_hours } => {
            let token = db.create_session(&user_id, ttl_hours).await?;
            info!("Issued session for user {user_id}");
            println!("{token}");
        }
        AdminCommand::RegisterReference {
            user_id,
            image_url,
            file_name,
            file_size,
        } => {
            let row = db
                .insert_reference_image(ReferenceImageInsert {
                    user_id,
                    image_url,
                    file_name,
                    file_size,
                })
                .await?;
            info!("Registered reference image {} for user {}", row.id, row.user_id);
            println!("{}", serde_json::to_string_pretty(&row)?);
        }
        AdminCommand::Analyze {
            user_id,
            reference_image_id,
        } => {
            let response = run_reference_analysis(state, &user_id, &reference_image_id)
                .await
                .with_context(|| format!("Analysis of {reference_image_id} failed"))?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }
    Ok(())
}
