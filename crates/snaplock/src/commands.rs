use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::ArgMatches;
use serde::Serialize;
use tracing::{error, info, warn};

use snaplock_core::events;
use snaplock_core::host::{INSTANT_MODE_VAR, VarContext};
use snaplock_core::scenes::ThumbnailCapturer;
use snaplock_core::window::FilterRules;
use snaplock_core::{
    Config, DesktopSnapshot, InvokeOutcome, ItemOutcome, LayoutPlan, LayoutService, Ports, Rect,
    RetryOutcome, SnaplockConfig, SnapshotWindowSystem, SystemLauncher, ToggleOutcome,
    WindowHandle, WindowSystem,
};

use crate::table;

/// One candidate window as printed by `snaplock windows`.
#[derive(Debug, Clone, Serialize)]
pub struct WindowRow {
    pub handle: WindowHandle,
    pub process_name: String,
    pub title: String,
    pub rect: Rect,
}

/// Service plus the snapshot backend it drives, so moves can be written back.
struct CliContext {
    service: LayoutService,
    desktop: Arc<SnapshotWindowSystem>,
}

impl CliContext {
    fn save_desktop(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.desktop.save().map_err(|e| {
            error!(event = "cli.snapshot_save_failed", error = %e);
            e.into()
        })
    }
}

pub fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    events::log_app_startup();

    let mut ctx = build_context(matches)?;

    let result = match matches.subcommand() {
        Some(("windows", sub_matches)) => handle_windows_command(&ctx, sub_matches),
        Some(("layout", sub_matches)) => handle_layout_command(&mut ctx, sub_matches),
        Some(("lock", sub_matches)) => handle_lock_command(&mut ctx, sub_matches),
        Some(("scene", sub_matches)) => handle_scene_command(&ctx, sub_matches),
        Some(("blacklist", sub_matches)) => handle_blacklist_command(&mut ctx, sub_matches),
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    };

    events::log_app_shutdown();
    result
}

/// Load configuration with warning on errors.
///
/// Falls back to defaults if config loading fails, but notifies the user via
/// stderr and the structured log event `cli.config.load_failed`.
fn load_config_with_warning() -> SnaplockConfig {
    match SnaplockConfig::load_hierarchy() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Could not load config: {}. Using defaults.\n\
                 Tip: Check ~/.snaplock/config.toml and ./.snaplock/config.toml for syntax errors.",
                e
            );
            warn!(
                event = "cli.config.load_failed",
                error = %e,
                "Config load failed, using defaults"
            );
            SnaplockConfig::default()
        }
    }
}

/// An explicit `--windows` file must exist. The default snapshot may be
/// missing, which reads as an empty desktop.
fn load_desktop(
    matches: &ArgMatches,
    paths: &Config,
    rules: FilterRules,
) -> Result<SnapshotWindowSystem, Box<dyn std::error::Error>> {
    let explicit = matches.get_one::<String>("windows").map(PathBuf::from);
    let path = explicit
        .clone()
        .unwrap_or_else(|| paths.windows_snapshot_file());

    if explicit.is_none() && !path.exists() {
        info!(
            event = "cli.snapshot_missing",
            path = %path.display()
        );
        return Ok(SnapshotWindowSystem::new(DesktopSnapshot::default()).with_rules(rules));
    }

    match SnapshotWindowSystem::load(&path) {
        Ok(desktop) => Ok(desktop.with_rules(rules)),
        Err(e) => {
            eprintln!("Failed to load desktop snapshot: {}", e);
            error!(event = "cli.snapshot_load_failed", error = %e);
            events::log_app_error(&e);
            Err(e.into())
        }
    }
}

fn build_context(matches: &ArgMatches) -> Result<CliContext, Box<dyn std::error::Error>> {
    let paths = Config::new();
    let settings = load_config_with_warning();
    if let Err(e) = settings.validate() {
        eprintln!("Invalid configuration: {}", e);
        error!(event = "cli.config.validation_failed", error = %e);
        return Err(e.into());
    }

    let rules = FilterRules::from_config(&settings.filter);
    let desktop = Arc::new(load_desktop(matches, &paths, rules)?);

    let work_area = match matches.get_one::<String>("work-area") {
        Some(raw) => raw.parse::<Rect>()?,
        None => desktop.work_area(),
    };

    info!(
        event = "cli.context_ready",
        data_dir = %paths.data_dir.display(),
        work_area = %work_area
    );

    let ports = Ports {
        windows: desktop.clone(),
        identity: desktop.clone(),
        launcher: Arc::new(SystemLauncher),
        thumbnailer: thumbnailer(),
    };

    Ok(CliContext {
        service: LayoutService::new(paths, settings, ports, work_area),
        desktop,
    })
}

#[cfg(feature = "thumbnails")]
fn thumbnailer() -> Arc<dyn ThumbnailCapturer> {
    Arc::new(snaplock_core::scenes::ScreenThumbnailer)
}

#[cfg(not(feature = "thumbnails"))]
fn thumbnailer() -> Arc<dyn ThumbnailCapturer> {
    Arc::new(snaplock_core::scenes::NoopThumbnailer)
}

fn handle_windows_command(
    ctx: &CliContext,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    info!(event = "cli.windows_started", json_output = json_output);

    let handles = match ctx.service.candidates() {
        Ok(handles) => handles,
        Err(e) => {
            eprintln!("Failed to list windows: {}", e);
            error!(event = "cli.windows_failed", error = %e);
            events::log_app_error(&e);
            return Err(e.into());
        }
    };

    let windows = ctx.service.matcher().windows();
    let rows: Vec<WindowRow> = handles
        .into_iter()
        .map(|handle| WindowRow {
            handle,
            process_name: windows.process_name(handle),
            title: windows.window_title(handle),
            rect: windows.visible_rect(handle),
        })
        .collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else if rows.is_empty() {
        println!("No candidate windows found.");
    } else {
        println!("Candidate windows:");
        table::print_windows_table(&rows);
    }

    info!(event = "cli.windows_completed", count = rows.len());
    Ok(())
}

fn handle_layout_command(
    ctx: &mut CliContext,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let instant = matches.get_flag("instant");
    let json_output = matches.get_flag("json");
    info!(
        event = "cli.layout_started",
        instant = instant,
        json_output = json_output
    );

    let mut host = if instant {
        VarContext::new().with_var(INSTANT_MODE_VAR, "true")
    } else {
        VarContext::new()
    };

    let plan = match ctx.service.invoke(&mut host, Instant::now()) {
        InvokeOutcome::NoWindows => {
            if json_output {
                println!("{}", serde_json::to_string_pretty(&LayoutPlan::default())?);
            } else {
                println!("No windows to arrange.");
            }
            info!(event = "cli.layout_completed", windows = 0);
            return Ok(());
        }
        InvokeOutcome::Instant(plan) => plan,
        InvokeOutcome::SessionOpened(plan) | InvokeOutcome::SessionRefreshed { plan, .. } => {
            // One-shot process: flush locks and end the session right away.
            ctx.service.close_session();
            plan
        }
        InvokeOutcome::Failed { message } => {
            eprintln!("Layout failed: {}", message);
            error!(event = "cli.layout_failed", error = %message);
            return Err(message.into());
        }
    };

    ctx.save_desktop()?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        println!("Arranged {} window(s):", plan.len());
        table::print_plan_table(&plan);
        if plan.is_degraded() {
            println!("Warning: not enough free space, some windows share a region.");
        }
    }

    info!(
        event = "cli.layout_completed",
        windows = plan.len(),
        degraded = plan.is_degraded()
    );
    Ok(())
}

fn handle_lock_command(
    ctx: &mut CliContext,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    match matches.subcommand() {
        Some(("list", sub_matches)) => handle_lock_list(ctx, sub_matches),
        Some(("toggle", sub_matches)) => handle_lock_toggle(ctx, sub_matches),
        Some(("remove", sub_matches)) => handle_lock_remove(ctx, sub_matches),
        _ => {
            error!(event = "cli.lock_subcommand_unknown");
            Err("Unknown lock subcommand".into())
        }
    }
}

fn handle_lock_list(
    ctx: &CliContext,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    let locks = ctx.service.lock_entries();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&locks)?);
    } else if locks.is_empty() {
        println!("No locked windows.");
    } else {
        println!("Locked windows:");
        table::print_locks_table(&locks);
    }

    info!(event = "cli.lock_list_completed", count = locks.len());
    Ok(())
}

fn handle_lock_toggle(
    ctx: &mut CliContext,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = *matches
        .get_one::<u64>("handle")
        .ok_or("Window handle is required")?;
    let handle = WindowHandle::new(raw);
    info!(event = "cli.lock_toggle_started", handle = %handle);

    match ctx.service.toggle_lock(handle, Instant::now()) {
        Ok(ToggleOutcome::Locked(entry)) => {
            println!("Locked {} at {}", entry.fingerprint(), entry.rect);
            info!(event = "cli.lock_toggle_completed", handle = %handle, locked = true);
            Ok(())
        }
        Ok(ToggleOutcome::Unlocked(entry)) => {
            println!("Unlocked {}", entry.fingerprint());
            info!(event = "cli.lock_toggle_completed", handle = %handle, locked = false);
            Ok(())
        }
        Err(e) => {
            eprintln!("Failed to toggle lock: {}", e);
            error!(event = "cli.lock_toggle_failed", handle = %handle, error = %e);
            events::log_app_error(&e);
            Err(e.into())
        }
    }
}

fn handle_lock_remove(
    ctx: &mut CliContext,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let index = *matches
        .get_one::<usize>("index")
        .ok_or("Lock index is required")?;

    match ctx.service.remove_lock(index, Instant::now()) {
        Ok(entry) => {
            println!("Removed lock {}: {}", index, entry.fingerprint());
            info!(event = "cli.lock_remove_completed", index = index);
            Ok(())
        }
        Err(e) => {
            eprintln!("Failed to remove lock: {}", e);
            error!(event = "cli.lock_remove_failed", index = index, error = %e);
            events::log_app_error(&e);
            Err(e.into())
        }
    }
}

fn handle_scene_command(
    ctx: &CliContext,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    match matches.subcommand() {
        Some(("list", sub_matches)) => handle_scene_list(ctx, sub_matches),
        Some(("save", sub_matches)) => handle_scene_save(ctx, sub_matches),
        Some(("apply", sub_matches)) => handle_scene_apply(ctx, sub_matches),
        Some(("delete", sub_matches)) => handle_scene_delete(ctx, sub_matches),
        Some(("clear", _)) => handle_scene_clear(ctx),
        _ => {
            error!(event = "cli.scene_subcommand_unknown");
            Err("Unknown scene subcommand".into())
        }
    }
}

fn handle_scene_list(
    ctx: &CliContext,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    let scenes = ctx.service.scenes();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&scenes)?);
    } else if scenes.is_empty() {
        println!("No saved scenes.");
    } else {
        println!("Scenes:");
        table::print_scenes_table(&scenes);
    }

    info!(event = "cli.scene_list_completed", count = scenes.len());
    Ok(())
}

fn handle_scene_save(
    ctx: &CliContext,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let name = matches.get_one::<String>("name").map(String::as_str);

    match ctx.service.save_scene(name) {
        Ok(scene) => {
            println!(
                "Saved scene '{}' with {} window(s)",
                scene.name,
                scene.items.len()
            );
            info!(
                event = "cli.scene_save_completed",
                name = %scene.name,
                items = scene.items.len()
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("Failed to save scene: {}", e);
            error!(event = "cli.scene_save_failed", error = %e);
            events::log_app_error(&e);
            Err(e.into())
        }
    }
}

fn handle_scene_apply(
    ctx: &CliContext,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let name = matches
        .get_one::<String>("name")
        .ok_or("Scene name is required")?;
    let wait = matches.get_flag("wait");

    let report = match ctx.service.apply_scene(name) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Failed to apply scene: {}", e);
            error!(event = "cli.scene_apply_failed", name = %name, error = %e);
            events::log_app_error(&e);
            return Err(e.into());
        }
    };

    let items = ctx
        .service
        .scenes()
        .into_iter()
        .find(|s| &s.name == name)
        .map(|s| s.items)
        .unwrap_or_default();
    for (item, outcome) in items.iter().zip(&report.outcomes) {
        println!("  {}: {}", item.fingerprint(), describe_item(outcome));
    }

    let (moved, relaunched, failed) = (report.moved(), report.relaunched(), report.failed());
    println!(
        "Applied scene '{}': {} moved, {} relaunched, {} failed",
        report.scene, moved, relaunched, failed
    );

    let pending = report.pending;
    if wait && !pending.is_empty() {
        println!("Waiting for {} relaunched window(s)...", pending.len());
        let outcomes = pending.wait();
        let placed = outcomes
            .iter()
            .filter(|o| matches!(o, RetryOutcome::Placed { .. }))
            .count();
        println!("{} of {} relaunched window(s) placed", placed, outcomes.len());
        info!(
            event = "cli.scene_apply_wait_completed",
            placed = placed,
            total = outcomes.len()
        );
    } else if !pending.is_empty() {
        println!(
            "{} relaunched window(s) not yet placed (use --wait to keep polling)",
            pending.len()
        );
    }

    ctx.save_desktop()?;

    info!(
        event = "cli.scene_apply_completed",
        name = %report.scene,
        moved = moved,
        relaunched = relaunched,
        failed = failed
    );
    Ok(())
}

fn describe_item(outcome: &ItemOutcome) -> String {
    match outcome {
        ItemOutcome::Moved { handle } => format!("moved window {}", handle),
        ItemOutcome::MoveFailed { handle, message } => {
            format!("move of window {} failed: {}", handle, message)
        }
        ItemOutcome::Relaunched => "relaunched".to_string(),
        ItemOutcome::LaunchFailed { message } => format!("launch failed: {}", message),
        ItemOutcome::NotFound => "not found".to_string(),
    }
}

fn handle_scene_delete(
    ctx: &CliContext,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let name = matches
        .get_one::<String>("name")
        .ok_or("Scene name is required")?;

    match ctx.service.delete_scene(name) {
        Ok(true) => {
            println!("Deleted scene '{}'", name);
            info!(event = "cli.scene_delete_completed", name = %name);
            Ok(())
        }
        Ok(false) => {
            println!("No scene named '{}'", name);
            info!(event = "cli.scene_delete_not_found", name = %name);
            Ok(())
        }
        Err(e) => {
            eprintln!("Failed to delete scene: {}", e);
            error!(event = "cli.scene_delete_failed", name = %name, error = %e);
            events::log_app_error(&e);
            Err(e.into())
        }
    }
}

fn handle_scene_clear(ctx: &CliContext) -> Result<(), Box<dyn std::error::Error>> {
    match ctx.service.clear_scenes() {
        Ok(()) => {
            println!("Cleared all scenes");
            info!(event = "cli.scene_clear_completed");
            Ok(())
        }
        Err(e) => {
            eprintln!("Failed to clear scenes: {}", e);
            error!(event = "cli.scene_clear_failed", error = %e);
            events::log_app_error(&e);
            Err(e.into())
        }
    }
}

fn handle_blacklist_command(
    ctx: &mut CliContext,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    match matches.subcommand() {
        Some(("list", _)) => {
            let names = ctx.service.blacklist().names();
            if names.is_empty() {
                println!("Blacklist is empty.");
            } else {
                for name in names {
                    println!("{}", name);
                }
            }
            info!(event = "cli.blacklist_list_completed", count = names.len());
            Ok(())
        }
        Some(("add", sub_matches)) => {
            let process = sub_matches
                .get_one::<String>("process")
                .ok_or("Process name is required")?;
            match ctx.service.blacklist_add(process) {
                Ok(true) => println!("Added '{}' to the blacklist", process.trim()),
                Ok(false) => println!("'{}' is already blacklisted", process.trim()),
                Err(e) => {
                    eprintln!("Failed to update blacklist: {}", e);
                    error!(event = "cli.blacklist_add_failed", process = %process, error = %e);
                    return Err(e.into());
                }
            }
            info!(event = "cli.blacklist_add_completed", process = %process);
            Ok(())
        }
        _ => {
            error!(event = "cli.blacklist_subcommand_unknown");
            Err("Unknown blacklist subcommand".into())
        }
    }
}
