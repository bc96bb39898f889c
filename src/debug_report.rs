use segugio::{Analysis, Case, EvidenceClass, ScanDetails};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_run(input: &str, analysis: &Analysis, details: Option<&ScanDetails>, threshold: f64, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("🔎 Query: \"{}\"", input.trim()), ansi::CYAN)));
    if analysis.truncated {
        println!("{}", palette.paint("  (truncated by --max-input)", ansi::YELLOW));
    }

    if let Some(details) = details {
        println!("\n{}", palette.paint("━━━ Cases ━━━", ansi::GRAY));
        print_case_metrics(details, &palette);
    }

    println!("\n{}", palette.paint("━━━ Matches ━━━", ansi::GRAY));
    print_matches(analysis, &palette);

    println!("\n{}", palette.paint("━━━ Source ━━━", ansi::GRAY));
    print_source(analysis, threshold, &palette);

    if let Some(details) = details {
        println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
        println!(
            "  Total: {}  │  Scan: {}  │  Dedup: {}  │  Bias: {}",
            palette.paint(format!("{:?}", details.total), ansi::GREEN),
            palette.paint(format!("{:?}", details.scan.total), ansi::CYAN),
            palette.dim(format!("{:?}", details.scan.dedup)),
            palette.dim(format!("{:?}", details.bias)),
        );
        if details.scan.analyzer_failures > 0 {
            println!(
                "  {}",
                palette.paint(
                    format!(
                        "analyzer failed {} of {} calls; author/topic matches were skipped",
                        details.scan.analyzer_failures, details.scan.analyzer_calls
                    ),
                    ansi::YELLOW
                )
            );
        }
    }
    println!();
}

fn print_case_metrics(details: &ScanDetails, palette: &ansi::Palette) {
    for m in &details.scan.cases {
        let label = format!("{:<22}", m.case.name());
        println!(
            "  {} {}  {} {}",
            palette.paint(label, ansi::BLUE),
            if m.kept > 0 {
                palette.paint(format!("✓ {} kept", m.kept), ansi::GREEN)
            } else {
                palette.dim(format!("✗ {} kept", m.kept))
            },
            palette.dim(format!("raw: {}  patterns: {}", m.raw_hits, m.patterns)),
            palette.dim(format!("{:?}", m.duration)),
        );
    }
}

fn print_matches(analysis: &Analysis, palette: &ansi::Palette) {
    println!("  {}", palette.bold(analysis.scan.summary_line()));
    if analysis.scan.is_empty() {
        println!("{}", palette.dim("  No evidence found"));
        return;
    }
    for (idx, m) in analysis.scan.matches().iter().enumerate() {
        let case = match m.label {
            Some(label) => format!("{} [{}]", m.case, label),
            None => m.case.to_string(),
        };
        println!(
            "  {} {} {} {}",
            palette.paint(format!("[{}]", idx), ansi::GRAY),
            palette.paint(case, ansi::CYAN),
            palette.dim("│"),
            palette.bold(palette.paint(&m.fragment, ansi::GREEN)),
        );
    }
}

fn print_source(analysis: &Analysis, threshold: f64, palette: &ansi::Palette) {
    let source = analysis.suggested_source(threshold);
    let color = match source {
        EvidenceClass::Metadata => ansi::YELLOW,
        EvidenceClass::Content => ansi::BLUE,
    };
    println!(
        "  p(metadata): {}  {} suggested: {}",
        palette.paint(format!("{:.3}", analysis.prob_metadata), ansi::GREEN),
        palette.dim("│"),
        palette.bold(palette.paint(source.name(), color)),
    );

    let conflicts: Vec<&str> = analysis.conflicting_cases(source).into_iter().map(Case::name).collect();
    if !conflicts.is_empty() {
        println!("  {} {}", palette.dim("conflicting:"), palette.paint(conflicts.join(", "), ansi::YELLOW));
    }
}
