use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

type DynError = Box<dyn std::error::Error>;

fn main() {
    if let Err(e) = try_main() {
        eprintln!("{}", e);
        std::process::exit(-1);
    }
}

fn try_main() -> Result<(), DynError> {
    if let Some(name) = env::args().nth(1) {
        if let Some(task) = TASKS.iter().find(|task| name == task.0) {
            (task.1)()?;
            return Ok(());
        }
    }
    print_help();
    Ok(())
}

fn print_help() {
    eprintln!("Tasks:");
    for task in TASKS {
        eprintln!("  {:20}{}", task.0, task.2);
    }
}

type Task = (&'static str, fn() -> Result<(), DynError>, &'static str);

const TASKS: &[Task] = &[
    ("ci", cmd_ci, "runs everything in CI"),
    ("check", cmd_check, "checks everything"),
    ("build", cmd_build, "builds everything"),
    ("test", cmd_test, "tests everything"),
    ("features", cmd_features, "tests with and without logging"),
    ("props", cmd_props, "runs the parser property tests with many cases"),
    ("fmt", cmd_fmt, "checks formatting"),
    ("doc", cmd_doc, "generates documentation for everything"),
    ("clippy", cmd_clippy, "run clippy for everything"),
];

fn cmd_ci() -> Result<(), DynError> {
    cmd_check()?;
    cmd_test()?;
    cmd_features()?;
    cmd_fmt()?;
    cmd_doc()?;
    Ok(())
}

fn cmd_check() -> Result<(), DynError> {
    cargo(&["check", "--workspace", "--features", "all"])
}

fn cmd_build() -> Result<(), DynError> {
    cargo(&["build", "--workspace", "--features", "all"])
}

fn cmd_test() -> Result<(), DynError> {
    cargo(&["test", "--workspace", "--features", "all"])
}

fn cmd_features() -> Result<(), DynError> {
    // Test the default features for everything.
    cargo(&["test", "--workspace"])?;

    // The library must build and pass without `log`.
    cargo(&["test", "-p", "macho-audit", "--no-default-features"])?;
    cargo(&[
        "test",
        "-p",
        "macho-audit",
        "--no-default-features",
        "--features",
        "logging",
    ])?;
    Ok(())
}

fn cmd_props() -> Result<(), DynError> {
    cargo_with(
        &["test", "-p", "macho-audit", "--release", "--test", "proptest_parse"],
        |cmd| {
            cmd.env("PROPTEST_CASES", "100000");
        },
    )
}

fn cmd_fmt() -> Result<(), DynError> {
    cargo(&["fmt", "--", "--check"])
}

fn cmd_doc() -> Result<(), DynError> {
    cargo_with(
        &["doc", "--workspace", "--lib", "--features", "all"],
        |cmd| {
            cmd.env("RUSTDOCFLAGS", "-D warnings");
        },
    )
}

fn cmd_clippy() -> Result<(), DynError> {
    cargo(&[
        "clippy",
        "--workspace",
        "--features",
        "all",
        "--all-targets",
    ])
}

fn cargo(args: &[&str]) -> Result<(), DynError> {
    cargo_with(args, |_| ())
}

fn cargo_with(args: &[&str], f: impl FnOnce(&mut Command)) -> Result<(), DynError> {
    let cargo = env::var("CARGO").unwrap_or_else(|_| "cargo".to_string());
    cmd_with(&cargo, args, f)
}

fn cmd_with<F>(program: &str, args: &[&str], f: F) -> Result<(), DynError>
where
    F: FnOnce(&mut Command),
{
    println!("Running '{} {}'", program, args.join(" "));
    let mut command = Command::new(program);
    command.current_dir(project_root()).args(args);
    f(&mut command);
    let status = command.status()?;
    if !status.success() {
        Err(format!("'{} {}' failed", program, args.join(" ")))?;
    }
    Ok(())
}

fn project_root() -> PathBuf {
    Path::new(&env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(1)
        .unwrap()
        .to_path_buf()
}
