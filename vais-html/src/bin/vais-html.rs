use std::env;
use std::fs;
use std::process;
use vais_html::parser::parse_results;
use vais_html::validator::unclosed_tags;
use vais_html::{compile_with_report, is_valid_html, sanitize, HtmlError, Limits, ParseResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Compile,
    Sanitize,
    Validate,
    Tree,
}

impl Command {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "compile" => Some(Command::Compile),
            "sanitize" => Some(Command::Sanitize),
            "validate" => Some(Command::Validate),
            "tree" => Some(Command::Tree),
            _ => None,
        }
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        print_usage();
        process::exit(1);
    }

    let Some(command) = Command::parse(&args[1]) else {
        eprintln!("Unknown command '{}'", args[1]);
        print_usage();
        process::exit(1);
    };

    let mut limits = Limits::default();
    let mut files = Vec::new();
    let mut rest = args[2..].iter();
    while let Some(arg) = rest.next() {
        if arg == "--limits" {
            let Some(path) = rest.next() else {
                eprintln!("--limits needs a file argument");
                process::exit(1);
            };
            limits = match Limits::from_file(path) {
                Ok(l) => l,
                Err(e) => {
                    eprintln!("✗ {}: {}", path, e);
                    process::exit(1);
                }
            };
        } else {
            files.push(arg.clone());
        }
    }

    let mut exit_code = 0;
    for file_path in files {
        match run(command, &file_path, &limits) {
            Ok(true) => {}
            Ok(false) => exit_code = 1,
            Err(e) if e.is_too_complex() => {
                eprintln!("✗ {} is too complex:", file_path);
                print_error(&e);
                exit_code = 1;
            }
            Err(e) => {
                eprintln!("✗ {} has errors:", file_path);
                print_error(&e);
                exit_code = 1;
            }
        }
    }

    process::exit(exit_code);
}

fn print_usage() {
    eprintln!("Usage: vais-html <compile|sanitize|validate|tree> [--limits limits.yaml] <file.html>...");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  vais-html compile block.html");
    eprintln!("  vais-html validate *.html");
}

/// Returns `Ok(false)` when the file was processed but failed a check.
fn run(command: Command, path: &str, limits: &Limits) -> Result<bool, HtmlError> {
    let content = fs::read_to_string(path)?;

    match command {
        Command::Compile => {
            let compiled = compile_with_report(&content, limits);
            for warning in &compiled.warnings {
                eprintln!("  warning: {}", warning);
            }
            if compiled.is_degraded() {
                eprintln!("  note: output is the sanitized input without styles");
            }
            println!("{}", compiled.html);
        }
        Command::Sanitize => println!("{}", sanitize(&content)),
        Command::Validate => {
            if is_valid_html(&content) {
                println!("✓ {} is well-formed", path);
            } else {
                eprintln!("✗ {} is not well-formed:", path);
                eprintln!("    {}", validation_problem(&content));
                return Ok(false);
            }
        }
        Command::Tree => {
            let mut nodes = Vec::new();
            for step in parse_results(&content, limits)? {
                match step {
                    ParseResult::Node(node) => nodes.push(node),
                    ParseResult::Skipped(reason) => eprintln!("  skipped: {:?}", reason),
                }
            }
            print!("{}", serde_yaml::to_string(&nodes)?);
        }
    }
    Ok(true)
}

/// One-line reason `content` failed `is_valid_html`.
fn validation_problem(content: &str) -> String {
    let open = unclosed_tags(content);
    if open.is_empty() {
        return "file is empty".to_string();
    }
    let tags: Vec<String> = open.iter().map(|t| format!("<{}>", t)).collect();
    format!("unclosed: {}", tags.join(", "))
}

fn print_error(error: &HtmlError) {
    match error {
        HtmlError::InputTooLarge { len, max } => {
            eprintln!("  Input too large:");
            eprintln!("    {} bytes, limit is {}", len, max);
        }
        HtmlError::MaxNestingDepthExceeded { max_depth } => {
            eprintln!("  Maximum nesting depth ({}) exceeded", max_depth);
        }
        e => {
            eprintln!("  {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn html_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn run_on(command: Command, content: &str) -> Result<bool, HtmlError> {
        let file = html_file(content);
        run(command, file.path().to_str().unwrap(), &Limits::default())
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(Command::parse("validate"), Some(Command::Validate));
        assert_eq!(Command::parse("tree"), Some(Command::Tree));
        assert_eq!(Command::parse("lint"), None);
    }

    #[test]
    fn test_validate_reports_unclosed_tags() {
        assert!(!run_on(Command::Validate, "<div><p>x</div>").unwrap());
        assert_eq!(validation_problem("<div><p>x</div>"), "unclosed: <div>, <p>");
    }

    #[test]
    fn test_validate_accepts_balanced_file() {
        assert!(run_on(Command::Validate, "<h1>Title</h1>").unwrap());
    }

    #[test]
    fn test_validate_empty_file() {
        assert!(!run_on(Command::Validate, "").unwrap());
        assert_eq!(validation_problem(""), "file is empty");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = run(
            Command::Validate,
            "/nonexistent/vais-html/missing.html",
            &Limits::default(),
        )
        .unwrap_err();
        assert!(matches!(err, HtmlError::Io(_)));
    }

    #[test]
    fn test_tree_respects_limits() {
        let file = html_file("<p>0123456789</p>");
        let err = run(
            Command::Tree,
            file.path().to_str().unwrap(),
            &Limits::new(8, 4),
        )
        .unwrap_err();
        assert!(err.is_too_complex());
    }

    #[test]
    fn test_compile_and_sanitize_succeed() {
        assert!(run_on(Command::Compile, "<p onclick=\"x()\">hi</p>").unwrap());
        assert!(run_on(Command::Sanitize, "<script>x</script><p>hi</p>").unwrap());
    }
}
