//! Phasegate: a daemonless governance gate for automation artifacts.
//!
//! **Phasegate is the hook engine that agent tooling calls before and after
//! mutating externally-stored artifacts** (orchestration workflows, voice
//! agents). It is not the orchestrator itself: the external host executes
//! the mutation; Phasegate decides whether it may proceed and records what
//! happened.
//!
//! # Core Principles
//!
//! - **Deletion blocked, archiving encouraged**: no governed artifact is
//!   ever deleted; phase reassignment to ARCHIVED is the retirement path
//! - **Phase lifecycle**: DEV → ALPHA → BETA → GA → PROD, plus terminal
//!   ARCHIVED; only DEV artifacts can be modified in place
//! - **Anti-proliferation**: before creating, similar existing artifacts
//!   are surfaced so agents clone instead of duplicating
//! - **Fail open**: an internal failure never blocks the host; every
//!   invocation terminates in a well-formed allow/block envelope
//! - **Local-first**: all state is plain text under `.phasegate/`,
//!   versioned alongside the project
//!
//! # Invocation model
//!
//! Each hook invocation is a short-lived process: one JSON request on
//! stdin, one JSON response on stdout, exit code 0 (allow) or 2 (block).
//! There is no daemon and no shared in-process state; the governance
//! document is read fully, mutated in memory, and written back fully.
//!
//! # Crate Structure
//!
//! - [`core`]: shared primitives (error, store layout, hook envelope,
//!   audit log, diagnostics)
//! - [`governance`]: the decision engine (phase gate, similarity matcher,
//!   document registry)

pub mod core;
pub mod governance;

use core::audit::{DeployEvent, DeployLog};
use core::diag::Diag;
use core::hook::{self, HookEvent, HookOp, HookRequest, HookResponse};
use core::error;
use core::store::Store;
use governance::engine::Engine;
use governance::kind::ArtifactKind;
use governance::phase::Phase;
use governance::similarity;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[clap(
    name = "phasegate",
    version = env!("CARGO_PKG_VERSION"),
    about = "Phasegate is the daemonless governance gate that agent hooks call before mutating externally-stored automation artifacts: phase lifecycle enforcement, duplicate detection, append-only audit trail."
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bootstrap the .phasegate control directory
    #[clap(name = "init", visible_alias = "i")]
    Init(InitCli),

    /// Run one hook invocation (JSON request on stdin, JSON response on stdout)
    #[clap(name = "hook", visible_alias = "h")]
    Hook(HookCli),

    /// Inspect and maintain the governance registry
    #[clap(name = "registry", visible_alias = "r")]
    Registry(RegistryCli),

    /// Deployment audit log access
    #[clap(name = "audit")]
    Audit(AuditCli),
}

#[derive(clap::Args, Debug)]
struct InitCli {
    /// Directory to initialize (defaults to current working directory).
    #[clap(short, long)]
    dir: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct HookCli {
    /// Hook firing point: PreToolUse or PostToolUse.
    /// Falls back to $CLAUDE_HOOK_TYPE, then the request envelope.
    #[clap(long)]
    event: Option<String>,
    /// Triggering tool name.
    /// Falls back to $CLAUDE_TOOL_NAME, then the request envelope.
    #[clap(long)]
    tool: Option<String>,
    /// Override artifact kind inference from the tool name.
    #[clap(long, value_enum)]
    kind: Option<ArtifactKind>,
}

#[derive(clap::Args, Debug)]
struct RegistryCli {
    #[clap(subcommand)]
    command: RegistryCommand,
}

#[derive(Subcommand, Debug)]
enum RegistryCommand {
    /// List tracked artifacts with their phases
    List {
        #[clap(long, value_enum, default_value_t = ArtifactKind::Workflow)]
        kind: ArtifactKind,
    },
    /// Show one artifact record in full
    Show {
        #[clap(long, value_enum, default_value_t = ArtifactKind::Workflow)]
        kind: ArtifactKind,
        #[clap(long)]
        id: String,
    },
    /// Rank tracked artifacts against a query text
    Similar {
        #[clap(long, value_enum, default_value_t = ArtifactKind::Workflow)]
        kind: ArtifactKind,
        #[clap(long)]
        query: String,
    },
    /// Register an artifact manually (post-success bookkeeping)
    Register {
        #[clap(long, value_enum, default_value_t = ArtifactKind::Workflow)]
        kind: ArtifactKind,
        #[clap(long)]
        id: String,
        #[clap(long)]
        name: String,
        #[clap(long, default_value = "")]
        snippet: String,
        #[clap(long, default_value = "DEV")]
        phase: Phase,
    },
    /// Reassign an artifact's lifecycle phase
    SetPhase {
        #[clap(long, value_enum, default_value_t = ArtifactKind::Workflow)]
        kind: ArtifactKind,
        #[clap(long)]
        id: String,
        #[clap(long)]
        phase: Phase,
    },
}

#[derive(clap::Args, Debug)]
struct AuditCli {
    #[clap(subcommand)]
    command: AuditCommand,
}

#[derive(Subcommand, Debug)]
enum AuditCommand {
    /// Print the append-only deployment log
    Show,
}

fn find_project_root(start_dir: &Path) -> Result<PathBuf, error::PhasegateError> {
    let mut current_dir = PathBuf::from(start_dir);
    loop {
        if current_dir.join(".phasegate").exists() {
            return Ok(current_dir);
        }
        if !current_dir.pop() {
            return Err(error::PhasegateError::NotFound(
                "'.phasegate' directory not found in current or parent directories. Run `phasegate init` first.".to_string(),
            ));
        }
    }
}

pub fn run() -> Result<(), error::PhasegateError> {
    let cli = Cli::parse();
    let current_dir = std::env::current_dir()?;

    match cli.command {
        Command::Init(init_cli) => run_init(init_cli, &current_dir),
        Command::Hook(hook_cli) => {
            // The hook surface never propagates an error to the host:
            // internal failure means a neutral allow, not a crash.
            let response = run_hook(hook_cli, &current_dir);
            println!(
                "{}",
                serde_json::to_string(&response)
                    .unwrap_or_else(|_| r#"{"continue":true}"#.to_string())
            );
            std::process::exit(response.exit_code());
        }
        Command::Registry(registry_cli) => {
            let store = resolve_store(&current_dir)?;
            run_registry(&store, registry_cli.command)
        }
        Command::Audit(audit_cli) => {
            let store = resolve_store(&current_dir)?;
            match audit_cli.command {
                AuditCommand::Show => {
                    let log_path = store.deploy_log_path();
                    if log_path.exists() {
                        let content = std::fs::read_to_string(log_path)?;
                        print!("{}", content);
                    } else {
                        println!("No deployment log found.");
                    }
                    Ok(())
                }
            }
        }
    }
}

fn resolve_store(current_dir: &Path) -> Result<Store, error::PhasegateError> {
    let project_root = find_project_root(current_dir)?;
    Ok(Store::new(&project_root.join(".phasegate")))
}

fn run_init(init_cli: InitCli, current_dir: &Path) -> Result<(), error::PhasegateError> {
    let target_dir = match init_cli.dir {
        Some(d) => d,
        None => current_dir.to_path_buf(),
    };
    let target_dir = std::fs::canonicalize(&target_dir).map_err(error::PhasegateError::IoError)?;
    let store = Store::new(&target_dir.join(".phasegate"));

    std::fs::create_dir_all(store.data_dir()).map_err(error::PhasegateError::IoError)?;
    std::fs::create_dir_all(store.logs_dir()).map_err(error::PhasegateError::IoError)?;

    println!();
    println!(
        "  {} {}",
        "▸".bright_cyan(),
        "PHASEGATE CONTROL DIRECTORY".bright_white().bold()
    );
    println!();

    for kind in [ArtifactKind::Workflow, ArtifactKind::Agent] {
        let doc_path = store.governance_path(kind);
        if doc_path.exists() {
            println!(
                "    {} {} {}",
                "✓".bright_green(),
                kind.governance_file().bright_white(),
                "(preserved - existing records kept)".bright_black()
            );
        } else {
            let diag = Diag::new(&store);
            let registry = governance::registry::Registry::new(doc_path, diag);
            registry.save(&governance::registry::GovernanceDoc::default());
            println!(
                "    {} {}",
                "●".bright_green(),
                kind.governance_file().bright_white()
            );
        }
    }

    let deploy_log = store.deploy_log_path();
    if deploy_log.exists() {
        println!(
            "    {} {} {}",
            "✓".bright_green(),
            "deploy.events.jsonl".bright_white(),
            "(preserved - event history kept)".bright_black()
        );
    } else {
        std::fs::write(&deploy_log, "").map_err(error::PhasegateError::IoError)?;
        println!(
            "    {} {}",
            "●".bright_green(),
            "deploy.events.jsonl".bright_white()
        );
    }

    println!();
    println!(
        "  {} Governance active in {}",
        "✓".bright_green(),
        store.root.display()
    );
    Ok(())
}

/// One hook invocation, start to finish. Total: every failure mode inside
/// this function resolves to a neutral allow so the host is never wedged
/// by its own governance layer.
fn run_hook(hook_cli: HookCli, current_dir: &Path) -> HookResponse {
    let request = HookRequest::read_from(&mut std::io::stdin());

    let event_name = hook_cli
        .event
        .or_else(|| std::env::var("CLAUDE_HOOK_TYPE").ok())
        .or_else(|| request.hook_event_name.clone())
        .unwrap_or_else(|| "PreToolUse".to_string());
    let tool_name = hook_cli
        .tool
        .or_else(|| std::env::var("CLAUDE_TOOL_NAME").ok())
        .or_else(|| request.tool_name.clone())
        .unwrap_or_default();

    let op = hook::classify(HookEvent::parse(&event_name), &tool_name);
    if op == HookOp::Observe {
        return HookResponse::allow();
    }

    let kind = hook_cli
        .kind
        .unwrap_or_else(|| hook::kind_for_tool(&tool_name));

    // No project root means nothing to govern: fail open.
    let Ok(store) = resolve_store(current_dir) else {
        return HookResponse::allow();
    };
    let engine = Engine::new(&store, kind);

    let input_name = field_str(&request.tool_input, "name");
    let input_id = request
        .tool_input
        .get("id")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    match op {
        HookOp::PreCreate => {
            let content = kind.content_text(&request.tool_input);
            engine.check_create(&input_name, &content).into()
        }
        HookOp::PreUpdate => engine
            .check_update(input_id.as_deref(), &input_name)
            .into(),
        HookOp::PreDelete => engine.check_delete(input_id.as_deref()).into(),
        HookOp::PostCreate => run_post_create(&store, &engine, &request, &input_name),
        HookOp::PostUpdate => {
            let id = input_id.or_else(|| kind.extract_id(&request.tool_output));
            append_deploy_event(&store, "update", &input_name, id, &request);
            HookResponse::allow()
        }
        HookOp::Observe => HookResponse::allow(),
    }
}

/// Post-create: register the new artifact as DEV and log the deployment.
/// Creation is the only operation that triggers auto-registration.
fn run_post_create(
    store: &Store,
    engine: &Engine,
    request: &HookRequest,
    input_name: &str,
) -> HookResponse {
    let kind = engine.kind();
    let id = kind.extract_id(&request.tool_output);
    let name = if input_name.is_empty() {
        field_str(&request.tool_output, "name")
    } else {
        input_name.to_string()
    };

    append_deploy_event(store, "create", &name, id.clone(), request);

    let Some(id) = id else {
        // Host did not hand back an id; nothing to track yet.
        return HookResponse::allow();
    };

    let snippet = kind.content_text(&request.tool_input);
    engine.register_artifact(&id, &name, &snippet, Phase::Dev);
    HookResponse {
        continue_: true,
        system_message: Some(format!(
            "✅ {}: {} \"{}\" registered as DEV phase (ID: {})",
            kind.banner(),
            kind.label(),
            name,
            id
        )),
    }
}

fn append_deploy_event(
    store: &Store,
    action: &str,
    name: &str,
    id: Option<String>,
    request: &HookRequest,
) {
    let has_error = request.tool_output.get("error").is_some();
    DeployLog::new(store).append(&DeployEvent::observed(action, name, id, has_error));
}

fn field_str(value: &serde_json::Value, field: &str) -> String {
    value
        .get(field)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

fn run_registry(store: &Store, command: RegistryCommand) -> Result<(), error::PhasegateError> {
    match command {
        RegistryCommand::List { kind } => {
            let engine = Engine::new(store, kind);
            let doc = engine.registry().load();
            if doc.artifacts.is_empty() {
                println!("No tracked {}s.", kind.label());
                return Ok(());
            }
            for (id, record) in &doc.artifacts {
                let phase = record.phase.to_string();
                let phase_colored = match record.phase {
                    Phase::Dev => phase.bright_green(),
                    Phase::Archived => phase.bright_black(),
                    _ => phase.bright_yellow(),
                };
                println!(
                    "  {} {} {} {}",
                    phase_colored.bold(),
                    id.bright_white(),
                    "—".bright_black(),
                    record.name
                );
            }
            Ok(())
        }
        RegistryCommand::Show { kind, id } => {
            let engine = Engine::new(store, kind);
            let doc = engine.registry().load();
            let record = doc.artifacts.get(&id).ok_or_else(|| {
                error::PhasegateError::NotFound(format!(
                    "{} '{}' is not tracked",
                    kind.label(),
                    id
                ))
            })?;
            print!("{}", serde_yaml::to_string(record)?);
            Ok(())
        }
        RegistryCommand::Similar { kind, query } => {
            let engine = Engine::new(store, kind);
            let doc = engine.registry().load();
            let matches = similarity::find_similar(&query, &doc);
            println!("{}", serde_json::to_string_pretty(&matches)?);
            Ok(())
        }
        RegistryCommand::Register {
            kind,
            id,
            name,
            snippet,
            phase,
        } => {
            let engine = Engine::new(store, kind);
            let doc = engine.registry().load();
            if doc.artifacts.contains_key(&id) {
                println!("Already tracked: {} (registration is insert-only)", id);
                return Ok(());
            }
            if engine.register_artifact(&id, &name, &snippet, phase) {
                println!("Registered {} \"{}\" as {} (ID: {})", kind.label(), name, phase, id);
                Ok(())
            } else {
                Err(error::PhasegateError::ValidationError(format!(
                    "failed to persist governance document for {}",
                    kind.label()
                )))
            }
        }
        RegistryCommand::SetPhase { kind, id, phase } => {
            let engine = Engine::new(store, kind);
            engine.set_phase(&id, phase)?;
            println!("Phase of {} set to {}", id, phase);
            Ok(())
        }
    }
}
