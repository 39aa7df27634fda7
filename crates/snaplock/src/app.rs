use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("snaplock")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Tile windows into free screen space around locked windows")
        .long_about(
            "snaplock packs unlocked windows into the gaps left by locked ones, remembers \
             locks across runs, and saves and restores whole window arrangements as scenes. \
             The CLI drives a JSON desktop snapshot so layouts can be planned and inspected.",
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("windows")
                .long("windows")
                .value_name("SNAPSHOT")
                .help("Desktop snapshot JSON file (default: <data dir>/windows.json)")
                .global(true),
        )
        .arg(
            Arg::new("work-area")
                .long("work-area")
                .value_name("X,Y,W,H")
                .help("Override the work area from the snapshot")
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        // Windows subcommand
        .subcommand(
            Command::new("windows")
                .about("List layout candidate windows")
                .arg(json_flag()),
        )
        // Layout subcommand
        .subcommand(
            Command::new("layout")
                .about("Arrange candidate windows around locked ones")
                .arg(
                    Arg::new("instant")
                        .long("instant")
                        .help("Shuffle unlocked windows and apply without a session")
                        .action(ArgAction::SetTrue),
                )
                .arg(json_flag()),
        )
        // Lock subcommand
        .subcommand(
            Command::new("lock")
                .about("Manage persisted window locks")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(
                    Command::new("list")
                        .about("List stored locks")
                        .arg(json_flag()),
                )
                .subcommand(
                    Command::new("toggle")
                        .about("Lock a window at its current rect, or unlock it")
                        .arg(
                            Arg::new("handle")
                                .help("Window handle as shown by 'snaplock windows'")
                                .required(true)
                                .value_parser(clap::value_parser!(u64)),
                        ),
                )
                .subcommand(
                    Command::new("remove")
                        .about("Remove a lock by its list index")
                        .arg(
                            Arg::new("index")
                                .help("Lock index as shown by 'snaplock lock list'")
                                .required(true)
                                .value_parser(clap::value_parser!(usize)),
                        ),
                ),
        )
        // Scene subcommand
        .subcommand(
            Command::new("scene")
                .about("Save and restore window arrangements")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(
                    Command::new("list")
                        .about("List saved scenes")
                        .arg(json_flag()),
                )
                .subcommand(
                    Command::new("save")
                        .about("Save the current candidate windows as a scene")
                        .arg(
                            Arg::new("name")
                                .help("Scene name (default: timestamped name)")
                                .required(false),
                        ),
                )
                .subcommand(
                    Command::new("apply")
                        .about("Move or relaunch windows to match a scene")
                        .arg(Arg::new("name").help("Scene name").required(true))
                        .arg(
                            Arg::new("wait")
                                .long("wait")
                                .help("Wait for relaunched windows before exiting")
                                .action(ArgAction::SetTrue),
                        ),
                )
                .subcommand(
                    Command::new("delete")
                        .about("Delete a scene and its thumbnail")
                        .arg(Arg::new("name").help("Scene name").required(true)),
                )
                .subcommand(Command::new("clear").about("Delete all scenes")),
        )
        // Blacklist subcommand
        .subcommand(
            Command::new("blacklist")
                .about("Manage processes excluded from layout")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(Command::new("list").about("List blacklisted process names"))
                .subcommand(
                    Command::new("add")
                        .about("Exclude a process from layout")
                        .arg(
                            Arg::new("process")
                                .help("Process name without extension")
                                .required(true),
                        ),
                ),
        )
}

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .help("Output in JSON format")
        .action(ArgAction::SetTrue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_build() {
        let app = build_cli();
        assert_eq!(app.get_name(), "snaplock");
    }

    #[test]
    fn test_cli_requires_subcommand() {
        let app = build_cli();
        let matches = app.try_get_matches_from(vec!["snaplock"]);
        assert!(matches.is_err());
    }

    #[test]
    fn test_cli_windows_json() {
        let app = build_cli();
        let matches = app.try_get_matches_from(vec!["snaplock", "windows", "--json"]);
        assert!(matches.is_ok());

        let matches = matches.unwrap();
        let windows_matches = matches.subcommand_matches("windows").unwrap();
        assert!(windows_matches.get_flag("json"));
    }

    #[test]
    fn test_cli_layout_instant() {
        let app = build_cli();
        let matches = app
            .try_get_matches_from(vec!["snaplock", "layout", "--instant"])
            .unwrap();
        let layout_matches = matches.subcommand_matches("layout").unwrap();
        assert!(layout_matches.get_flag("instant"));
        assert!(!layout_matches.get_flag("json"));
    }

    #[test]
    fn test_cli_global_snapshot_and_work_area() {
        let app = build_cli();
        let matches = app
            .try_get_matches_from(vec![
                "snaplock",
                "--windows",
                "/tmp/desk.json",
                "--work-area",
                "0,0,1920,1040",
                "windows",
            ])
            .unwrap();
        assert_eq!(
            matches.get_one::<String>("windows").map(String::as_str),
            Some("/tmp/desk.json")
        );
        assert_eq!(
            matches.get_one::<String>("work-area").map(String::as_str),
            Some("0,0,1920,1040")
        );
    }

    #[test]
    fn test_cli_lock_toggle_parses_handle() {
        let app = build_cli();
        let matches = app
            .try_get_matches_from(vec!["snaplock", "lock", "toggle", "42"])
            .unwrap();
        let lock_matches = matches.subcommand_matches("lock").unwrap();
        let toggle_matches = lock_matches.subcommand_matches("toggle").unwrap();
        assert_eq!(toggle_matches.get_one::<u64>("handle"), Some(&42));
    }

    #[test]
    fn test_cli_lock_toggle_rejects_non_numeric_handle() {
        let app = build_cli();
        let matches = app.try_get_matches_from(vec!["snaplock", "lock", "toggle", "abc"]);
        assert!(matches.is_err());
    }

    #[test]
    fn test_cli_lock_remove_requires_index() {
        let app = build_cli();
        let matches = app.try_get_matches_from(vec!["snaplock", "lock", "remove"]);
        assert!(matches.is_err());
    }

    #[test]
    fn test_cli_scene_save_name_is_optional() {
        let app = build_cli();
        let matches = app.try_get_matches_from(vec!["snaplock", "scene", "save"]);
        assert!(matches.is_ok());

        let app = build_cli();
        let matches = app
            .try_get_matches_from(vec!["snaplock", "scene", "save", "work"])
            .unwrap();
        let save_matches = matches
            .subcommand_matches("scene")
            .and_then(|m| m.subcommand_matches("save"))
            .unwrap();
        assert_eq!(
            save_matches.get_one::<String>("name").map(String::as_str),
            Some("work")
        );
    }

    #[test]
    fn test_cli_scene_apply_wait() {
        let app = build_cli();
        let matches = app
            .try_get_matches_from(vec!["snaplock", "scene", "apply", "work", "--wait"])
            .unwrap();
        let apply_matches = matches
            .subcommand_matches("scene")
            .and_then(|m| m.subcommand_matches("apply"))
            .unwrap();
        assert!(apply_matches.get_flag("wait"));
    }

    #[test]
    fn test_cli_blacklist_add_requires_process() {
        let app = build_cli();
        let matches = app.try_get_matches_from(vec!["snaplock", "blacklist", "add"]);
        assert!(matches.is_err());
    }
}
