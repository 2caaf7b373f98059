// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod render;
mod runtime;

use anyhow::{Context, Result, anyhow, bail};
use config::Config;
use lectern_app::{
    Badge, Course, CourseId, Educator, Enrollment, EntityKind, ListCommand, ListKey, ListPage,
    MentorNote, ProgramSection, Record, RecordSource, Selection,
};
use lectern_db::Store;
use lectern_testkit::ClassroomFaker;
use render::TableRow;
use runtime::DbRuntime;
use serde::Serialize;
use std::env;
use std::path::PathBuf;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `lectern --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    init_logging(&config.log_level())?;

    let db_path = if options.demo {
        PathBuf::from(":memory:")
    } else {
        config.db_path()?
    };
    if options.print_db_path {
        println!("{}", db_path.display());
        return Ok(());
    }

    let mut store = Store::open(&db_path).with_context(|| {
        format!(
            "open database {} -- if this path is wrong, set [storage].db_path or LECTERN_DB_PATH",
            db_path.display()
        )
    })?;
    store.bootstrap()?;
    store.set_max_attachment_size(config.max_attachment_size())?;
    tracing::debug!(path = %db_path.display(), "store ready");

    let mut runtime = DbRuntime::new(&store).with_course_scope(options.course.map(CourseId::new));
    if options.demo {
        runtime.seed_demo_data(&mut ClassroomFaker::anchored(1, OffsetDateTime::now_utc()))?;
    }
    if options.check_only {
        return Ok(());
    }

    let Some(target) = options.target else {
        print_help();
        return Ok(());
    };

    let page_size = options.page_size.unwrap_or_else(|| config.page_size());
    let output = match target {
        Target::List(EntityKind::Course) => {
            show_page::<Course>(&mut runtime, &options, page_size)?
        }
        Target::List(EntityKind::Enrollment) => {
            show_page::<Enrollment>(&mut runtime, &options, page_size)?
        }
        Target::List(EntityKind::Badge) => show_page::<Badge>(&mut runtime, &options, page_size)?,
        Target::List(EntityKind::ProgramSection) => {
            show_page::<ProgramSection>(&mut runtime, &options, page_size)?
        }
        Target::List(EntityKind::MentorNote) => {
            show_page::<MentorNote>(&mut runtime, &options, page_size)?
        }
        Target::List(EntityKind::Educator) => {
            show_page::<Educator>(&mut runtime, &options, page_size)?
        }
        Target::Settings => {
            runtime.apply_settings(&options.sets)?;
            let settings = store.list_settings()?;
            if options.json {
                serde_json::to_string_pretty(&settings).context("encode settings as JSON")?
            } else {
                render::settings_text(&settings)
            }
        }
        Target::Profile => {
            if !options.sets.is_empty() {
                runtime.apply_profile(&options.sets)?;
            }
            let profile = store.get_profile()?;
            if options.json {
                serde_json::to_string_pretty(&profile).context("encode profile as JSON")?
            } else {
                render::profile_text(profile.as_ref())
            }
        }
    };

    print!("{output}");
    if options.json {
        println!();
    }
    Ok(())
}

/// Loads one list page, applies the command-line view options through the
/// page's reducer and renders what the page would show.
fn show_page<T>(
    source: &mut impl RecordSource<T>,
    options: &CliOptions,
    page_size: usize,
) -> Result<String>
where
    T: Record + TableRow + Serialize,
{
    let label = T::KIND.label();
    let mut page = ListPage::<T>::new(page_size);
    if !page.load(source) {
        bail!(
            "{} -- check the database path and rerun",
            page.error().unwrap_or("load failed")
        );
    }

    if let Some(query) = &options.query {
        page.dispatch(ListCommand::SetQuery(query.clone()));
    }
    for (name, value) in &options.filters {
        let filter = parse_key::<T::Filter>(name, "filter", label)?;
        page.dispatch(ListCommand::SetFilter(filter, Selection::parse(value)));
    }
    if let Some(sort) = &options.sort {
        let sort = parse_key::<T::Sort>(sort, "sort", label)?;
        page.dispatch(ListCommand::SetSort(sort));
    }
    if let Some(number) = options.page {
        page.dispatch(ListCommand::SetPage(number));
    }

    if options.analytics {
        let summary = page.analytics(OffsetDateTime::now_utc());
        return if options.json {
            serde_json::to_string_pretty(&summary).context("encode analytics as JSON")
        } else {
            render::summary_text(&summary)
        };
    }

    let visible = page.visible();
    if options.json {
        render::page_json(&visible)
    } else {
        Ok(render::page_text(&visible, label))
    }
}

fn parse_key<K: ListKey>(raw: &str, what: &str, label: &str) -> Result<K> {
    K::parse(raw).ok_or_else(|| {
        anyhow!(
            "unknown {what} {raw:?} for {label} -- expected one of: {}",
            K::ALL
                .iter()
                .map(|key| key.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    })
}

fn init_logging(config_level: &str) -> Result<()> {
    let filter = match env::var("LECTERN_LOG") {
        Ok(spec) if !spec.trim().is_empty() => EnvFilter::try_new(&spec)
            .with_context(|| format!("invalid LECTERN_LOG value {spec:?}"))?,
        _ => EnvFilter::try_new(config_level)
            .with_context(|| format!("invalid [log].level value {config_level:?}"))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    List(EntityKind),
    Settings,
    Profile,
}

impl Target {
    fn parse(raw: &str) -> Result<Self> {
        match raw {
            "settings" => Ok(Self::Settings),
            "profile" => Ok(Self::Profile),
            other => EntityKind::parse(other).map(Self::List).ok_or_else(|| {
                anyhow!(
                    "unknown page {other:?} -- expected one of: {}, settings, profile",
                    EntityKind::ALL
                        .iter()
                        .map(|kind| kind.label())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    target: Option<Target>,
    query: Option<String>,
    filters: Vec<(String, String)>,
    sort: Option<String>,
    page: Option<usize>,
    page_size: Option<usize>,
    course: Option<i64>,
    sets: Vec<(String, String)>,
    analytics: bool,
    json: bool,
    print_config_path: bool,
    print_db_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        target: None,
        query: None,
        filters: Vec::new(),
        sort: None,
        page: None,
        page_size: None,
        course: None,
        sets: Vec::new(),
        analytics: false,
        json: false,
        print_config_path: false,
        print_db_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        let mut value_for = |flag: &str, what: &str| -> Result<String> {
            iter.next()
                .map(|value| value.as_ref().to_owned())
                .ok_or_else(|| anyhow!("{flag} requires {what}"))
        };
        match arg.as_ref() {
            "--config" => {
                options.config_path = PathBuf::from(value_for("--config", "a file path")?);
            }
            "--query" | "-q" => {
                options.query = Some(value_for("--query", "search text")?);
            }
            "--filter" | "-f" => {
                let raw = value_for("--filter", "a name=value pair")?;
                options.filters.push(split_pair("--filter", &raw)?);
            }
            "--sort" | "-s" => {
                options.sort = Some(value_for("--sort", "a sort key")?);
            }
            "--page" | "-p" => {
                let raw = value_for("--page", "a page number")?;
                options.page = Some(parse_count("--page", &raw)?);
            }
            "--page-size" => {
                let raw = value_for("--page-size", "a row count")?;
                let size = parse_count("--page-size", &raw)?;
                if size == 0 {
                    bail!("--page-size must be positive, got 0");
                }
                options.page_size = Some(size);
            }
            "--course" => {
                let raw = value_for("--course", "a course id")?;
                let id = raw
                    .trim()
                    .parse::<i64>()
                    .ok()
                    .filter(|id| *id > 0)
                    .ok_or_else(|| anyhow!("--course expects a positive course id, got {raw:?}"))?;
                options.course = Some(id);
            }
            "--set" => {
                let raw = value_for("--set", "a key=value pair")?;
                options.sets.push(split_pair("--set", &raw)?);
            }
            "--analytics" => {
                options.analytics = true;
            }
            "--json" => {
                options.json = true;
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-path" => {
                options.print_db_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            flag if flag.starts_with('-') => {
                bail!("unknown argument {flag:?}; run with --help to see supported options");
            }
            positional => {
                if options.target.is_none() {
                    options.target = Some(Target::parse(positional)?);
                } else if options.page.is_some() {
                    bail!("page number given twice, got extra {positional:?}");
                } else {
                    let number = positional.parse::<usize>().map_err(|_| {
                        anyhow!(
                            "only one page may be shown at a time, got extra {positional:?}; pass a page number to pick a page of rows"
                        )
                    })?;
                    options.page = Some(number);
                }
            }
        }
    }

    if !options.sets.is_empty()
        && !matches!(options.target, Some(Target::Settings | Target::Profile))
    {
        bail!("--set only applies to the settings and profile pages");
    }

    Ok(options)
}

fn split_pair(flag: &str, raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("{flag} expects name=value, got {raw:?}"))?;
    let name = name.trim();
    if name.is_empty() {
        bail!("{flag} expects name=value, got {raw:?}");
    }
    Ok((name.to_owned(), value.to_owned()))
}

fn parse_count(flag: &str, raw: &str) -> Result<usize> {
    raw.trim()
        .parse::<usize>()
        .with_context(|| format!("{flag} expects a whole number, got {raw:?}"))
}

fn print_help() {
    println!("lectern <page> [n] [options]");
    println!("  pages: courses, enrollments, badges, sections, notes, educators,");
    println!("         settings, profile");
    println!();
    println!("  --query, -q <text>       Case-insensitive search over the page's text fields");
    println!("  --filter, -f <name=val>  Exact-match filter; repeatable; `all` clears it");
    println!("  --sort, -s <key>         Sort key for the page");
    println!("  --page, -p <n>           Page number (1-based)");
    println!("  --page-size <n>          Rows per page (default from [listing].page_size)");
    println!("  --course <id>            Limit enrollments to one course");
    println!("  --analytics              Print the page's summary instead of rows");
    println!("  --json                   Print JSON instead of a table");
    println!("  --set <key=value>        Update a setting or profile field; repeatable");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved database path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Use seeded demo data (in-memory)");
    println!("  --check                  Validate config + DB and exit");
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, Target, parse_cli_args, show_page};
    use crate::runtime::DbRuntime;
    use anyhow::Result;
    use lectern_app::{Course, Educator, EntityKind};
    use lectern_db::Store;
    use lectern_testkit::ClassroomFaker;
    use std::path::PathBuf;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/lectern-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                target: None,
                query: None,
                filters: Vec::new(),
                sort: None,
                page: None,
                page_size: None,
                course: None,
                sets: Vec::new(),
                analytics: false,
                json: false,
                print_config_path: false,
                print_db_path: false,
                demo: false,
                print_example: false,
                check_only: false,
                show_help: false,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_reads_page_and_view_options() -> Result<()> {
        let options = parse_cli_args(
            vec![
                "courses",
                "--query",
                "al",
                "--filter",
                "status=Active",
                "-f",
                "skill=writing",
                "--sort",
                "enrollment",
                "--page",
                "2",
                "--page-size",
                "10",
                "--json",
            ],
            default_options_path(),
        )?;
        assert_eq!(options.target, Some(Target::List(EntityKind::Course)));
        assert_eq!(options.query.as_deref(), Some("al"));
        assert_eq!(
            options.filters,
            vec![
                ("status".to_owned(), "Active".to_owned()),
                ("skill".to_owned(), "writing".to_owned()),
            ]
        );
        assert_eq!(options.sort.as_deref(), Some("enrollment"));
        assert_eq!(options.page, Some(2));
        assert_eq!(options.page_size, Some(10));
        assert!(options.json);
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_values() {
        let error = parse_cli_args(vec!["--config"], default_options_path())
            .expect_err("missing config value should fail");
        assert!(error.to_string().contains("--config requires a file path"));

        let error = parse_cli_args(vec!["courses", "--filter", "status"], default_options_path())
            .expect_err("filter without value should fail");
        assert!(error.to_string().contains("name=value"));
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument_and_page() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));

        let error = parse_cli_args(vec!["students"], default_options_path())
            .expect_err("unknown page should fail");
        assert!(error.to_string().contains("sections"));
    }

    #[test]
    fn parse_cli_args_reads_positional_page_number() -> Result<()> {
        let options = parse_cli_args(vec!["courses", "2"], default_options_path())?;
        assert_eq!(options.target, Some(Target::List(EntityKind::Course)));
        assert_eq!(options.page, Some(2));

        let options = parse_cli_args(vec!["--json", "notes", "3"], default_options_path())?;
        assert_eq!(options.target, Some(Target::List(EntityKind::MentorNote)));
        assert_eq!(options.page, Some(3));

        let error = parse_cli_args(vec!["courses", "--page", "2", "4"], default_options_path())
            .expect_err("second page number should fail");
        assert!(error.to_string().contains("page number given twice"));

        let error = parse_cli_args(vec!["courses", "badges"], default_options_path())
            .expect_err("second page name should fail");
        assert!(error.to_string().contains("only one page"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_rejects_zero_page_size_and_bad_course() {
        assert!(parse_cli_args(vec!["courses", "--page-size", "0"], default_options_path()).is_err());
        assert!(parse_cli_args(vec!["enrollments", "--course", "-3"], default_options_path()).is_err());
    }

    #[test]
    fn set_requires_settings_or_profile_page() -> Result<()> {
        let error = parse_cli_args(vec!["courses", "--set", "a=b"], default_options_path())
            .expect_err("set on list page should fail");
        assert!(error.to_string().contains("settings and profile"));

        let options = parse_cli_args(
            vec!["settings", "--set", "grading.auto=on"],
            default_options_path(),
        )?;
        assert_eq!(options.target, Some(Target::Settings));
        assert_eq!(
            options.sets,
            vec![("grading.auto".to_owned(), "on".to_owned())]
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_print_and_check_flags() -> Result<()> {
        let options = parse_cli_args(
            vec!["--print-config-path", "--print-example-config", "--check", "--demo"],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(!options.print_db_path);
        assert!(options.demo);
        assert!(options.print_example);
        assert!(options.check_only);
        assert!(!options.show_help);
        Ok(())
    }

    #[test]
    fn show_page_applies_filters_and_reports_bad_keys() -> Result<()> {
        let store = Store::open_memory()?;
        store.bootstrap()?;
        let mut runtime = DbRuntime::new(&store);
        runtime.seed_demo_data(&mut ClassroomFaker::new(5))?;

        let options = parse_cli_args(
            vec!["courses", "--filter", "status=Draft", "--json"],
            default_options_path(),
        )?;
        let output = show_page::<Course>(&mut runtime, &options, 25)?;
        let value: serde_json::Value = serde_json::from_str(&output)?;
        let rows = value["rows"].as_array().cloned().unwrap_or_default();
        assert!(rows.iter().all(|row| row["status"] == "Draft"));

        let options = parse_cli_args(
            vec!["courses", "--sort", "popularity"],
            default_options_path(),
        )?;
        let error = show_page::<Course>(&mut runtime, &options, 25).expect_err("bad sort key");
        assert!(error.to_string().contains("enrollment"));

        let options = parse_cli_args(vec!["courses", "--analytics"], default_options_path())?;
        let summary = show_page::<Course>(&mut runtime, &options, 25)?;
        assert!(summary.contains("total_enrolled"));
        Ok(())
    }

    #[test]
    fn educators_page_filters_by_account_status() -> Result<()> {
        let store = Store::open_memory()?;
        store.bootstrap()?;
        let mut runtime = DbRuntime::new(&store);
        runtime.seed_demo_data(&mut ClassroomFaker::new(8))?;

        let options = parse_cli_args(
            vec!["educators", "--filter", "status=active", "--sort", "experience", "--json"],
            default_options_path(),
        )?;
        assert_eq!(options.target, Some(Target::List(EntityKind::Educator)));
        let output = show_page::<Educator>(&mut runtime, &options, 25)?;
        let value: serde_json::Value = serde_json::from_str(&output)?;
        let rows = value["rows"].as_array().cloned().unwrap_or_default();
        assert!(!rows.is_empty());
        assert!(rows.iter().all(|row| row["account_status"] == "Active"));

        let options = parse_cli_args(vec!["educators", "--analytics"], default_options_path())?;
        let summary = show_page::<Educator>(&mut runtime, &options, 25)?;
        assert!(summary.contains("average_experience_years"));
        Ok(())
    }
}
