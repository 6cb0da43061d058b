use std::fmt;

use clap::{Parser, ValueEnum};
use jobboard::{
    Job, JobBoardView, SortField, SortOrder,
    domain::{Paging, job::DATE_FORMAT},
};
use serde_json::json;
use tracing::instrument;

use super::{
    Context, load,
    terminal::{Colorize, is_narrow},
};

/// Command arguments for `jobs list`.
#[derive(Debug, Parser, Default)]
#[command(about = "List one page of jobs")]
pub struct List {
    /// Page to show.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    page: u32,

    /// Jobs per page (default: from configuration).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    limit: Option<u32>,

    /// Case-insensitive match against title, company and location.
    #[arg(long)]
    search: Option<String>,

    /// Only jobs of this type.
    #[arg(long, value_name = "TYPE")]
    job_type: Option<String>,

    /// Only jobs in this location.
    #[arg(long)]
    location: Option<String>,

    /// Only jobs with this tag.
    #[arg(long)]
    tag: Option<String>,

    /// Sort field (default: from configuration).
    #[arg(long, value_name = "FIELD")]
    sort: Option<SortField>,

    /// Also ask the server to order results by the sort field.
    #[arg(long)]
    order: Option<SortOrder>,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Suppress headers and format rows for scripting.
    #[arg(long)]
    quiet: bool,
}

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => f.write_str("table"),
            Self::Json => f.write_str("json"),
            Self::Csv => f.write_str("csv"),
        }
    }
}

impl List {
    #[instrument(level = "debug", skip_all)]
    pub async fn run(self, context: &Context) -> anyhow::Result<()> {
        let mut board = context.board(self.limit)?;

        let view = board.view_mut();
        view.start_at_page(self.page);
        if let Some(term) = self.search {
            view.set_search(term);
        }
        if let Some(job_type) = self.job_type {
            view.set_job_type_filter(job_type);
        }
        if let Some(location) = self.location {
            view.set_location_filter(location);
        }
        if let Some(tag) = self.tag {
            view.set_tag_filter(tag);
        }
        if let Some(field) = self.sort {
            view.set_sort(field);
        }
        view.set_server_order(self.order);
        // Filters reset the page, so apply it again.
        view.start_at_page(self.page);

        load(&mut board).await?;

        match self.output {
            OutputFormat::Table => print_page(board.view(), self.quiet),
            OutputFormat::Json => println!("{}", render_json(board.view())?),
            OutputFormat::Csv => print!("{}", render_csv(&board.view().visible_jobs(), self.quiet)),
        }
        Ok(())
    }
}

/// Prints the visible jobs of `view` followed by a page footer.
pub fn print_page(view: &JobBoardView, quiet: bool) {
    let jobs = view.visible_jobs();

    if quiet {
        for job in &jobs {
            println!("{}\t{}", job.id, job.title);
        }
        return;
    }

    if jobs.is_empty() {
        let message = view.filters().search().map_or_else(
            || "No jobs found".to_string(),
            |term| format!("No jobs found matching \"{term}\""),
        );
        println!("{}", message.dim());
    } else if is_narrow() {
        print!("{}", render_cards(&jobs));
    } else {
        print!("{}", render_table(&jobs));
    }

    println!();
    println!("{}", footer(view).dim());
}

fn footer(view: &JobBoardView) -> String {
    if view.paging() == Some(Paging::Unpaginated) {
        let shown = view.visible_jobs().len();
        let total = view.total_jobs().unwrap_or_default();
        return format!("Showing {shown} of {total} jobs (not paginated by the server)");
    }

    let mut footer = format!("Page {} of {}", view.current_page(), view.total_pages());
    if let Some(total) = view.total_jobs() {
        let noun = if total == 1 { "job" } else { "jobs" };
        footer.push_str(&format!(" ({total} {noun})"));
    }
    footer
}

const HEADERS: [&str; 7] = ["ID", "TITLE", "COMPANY", "LOCATION", "TYPE", "POSTED", "TAGS"];

fn row(job: &Job) -> [String; 7] {
    [
        job.id.to_string(),
        job.title.clone(),
        job.company.clone(),
        job.location.clone(),
        job.job_type.clone(),
        job.posting_date.format(DATE_FORMAT).to_string(),
        job.tags.join(", "),
    ]
}

fn render_table(jobs: &[Job]) -> String {
    let rows: Vec<[String; 7]> = jobs.iter().map(row).collect();

    // Determine column widths for alignment.
    let widths: Vec<usize> = HEADERS
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            rows.iter()
                .map(|row| row[idx].chars().count())
                .max()
                .unwrap_or(0)
                .max(header.len())
        })
        .collect();

    let mut out = String::new();
    let line = |cells: &[&str]| {
        let mut line = String::new();
        for (cell, width) in cells.iter().zip(&widths) {
            line.push_str(&format!("{cell:<width$}  "));
        }
        line.trim_end().to_string()
    };

    out.push_str(&line(&HEADERS));
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    out.push_str(&line(&rule.iter().map(String::as_str).collect::<Vec<_>>()));
    out.push('\n');

    for row in &rows {
        out.push_str(&line(&row.iter().map(String::as_str).collect::<Vec<_>>()));
        out.push('\n');
    }
    out
}

/// One block per job, for terminals too narrow for the table.
fn render_cards(jobs: &[Job]) -> String {
    let mut out = String::new();
    for job in jobs {
        out.push_str(&format!("{} at {}\n", job.title, job.company));
        out.push_str(&format!(
            "  {} · {} · {}\n",
            job.location,
            job.job_type,
            job.posting_date.format(DATE_FORMAT)
        ));
        if !job.tags.is_empty() {
            out.push_str(&format!("  {}\n", job.tags.join(", ")));
        }
        out.push_str(&format!("  id: {}\n", job.id));
    }
    out
}

fn render_json(view: &JobBoardView) -> anyhow::Result<String> {
    let output = json!({
        "jobs": view.visible_jobs(),
        "pagination": {
            "current_page": view.current_page(),
            "total_pages": view.total_pages(),
            "total_jobs": view.total_jobs(),
            "limit": view.limit(),
        }
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

fn render_csv(jobs: &[Job], quiet: bool) -> String {
    let mut out = String::new();
    if !quiet {
        out.push_str("id,title,company,location,job_type,posting_date,tags\n");
    }
    for job in jobs {
        let fields: Vec<String> = row(job).iter().map(|value| csv_escape(value)).collect();
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        let escaped = value.replace('"', "\"\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use jobboard::domain::JobPage;
    use test_case::test_case;

    use super::*;

    fn job(id: &str, title: &str, tags: &[&str]) -> Job {
        Job {
            id: id.parse().unwrap(),
            title: title.to_string(),
            company: "Acme".to_string(),
            location: "London".to_string(),
            posting_date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            job_type: "Full-time".to_string(),
            tags: tags.iter().map(|tag| (*tag).to_string()).collect(),
        }
    }

    #[test_case("plain", "plain"; "plain value")]
    #[test_case("a, b", "\"a, b\""; "comma")]
    #[test_case("say \"hi\"", "\"say \"\"hi\"\"\""; "quotes")]
    #[test_case("two\nlines", "\"two\nlines\""; "newline")]
    fn csv_escaping(input: &str, expected: &str) {
        assert_eq!(csv_escape(input), expected);
    }

    #[test]
    fn csv_has_header_unless_quiet() {
        let jobs = vec![job("1", "Actuary", &["life", "pricing"])];

        assert_eq!(
            render_csv(&jobs, false),
            "id,title,company,location,job_type,posting_date,tags\n\
             1,Actuary,Acme,London,Full-time,2024-03-09,\"life, pricing\"\n"
        );
        assert_eq!(
            render_csv(&jobs, true),
            "1,Actuary,Acme,London,Full-time,2024-03-09,\"life, pricing\"\n"
        );
    }

    #[test]
    fn table_aligns_columns() {
        let table = render_table(&[job("1", "Actuary", &[]), job("22", "Data Scientist", &["ml"])]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("ID  TITLE           COMPANY"));
        assert!(lines[1].starts_with("--  --------------  -------"));
        assert!(lines[3].starts_with("22  Data Scientist  Acme"));
        assert!(lines[3].ends_with("ml"));
    }

    #[test]
    fn cards_include_id_and_tags() {
        let cards = render_cards(&[job("7", "Actuary", &["life"])]);

        assert!(cards.starts_with("Actuary at Acme\n"));
        assert!(cards.contains("  London · Full-time · 2024-03-09\n"));
        assert!(cards.contains("  life\n"));
        assert!(cards.ends_with("  id: 7\n"));
    }

    #[test]
    fn footer_omits_unknown_total() {
        let view = JobBoardView::new(20, SortField::Title);
        assert_eq!(footer(&view), "Page 1 of 1");
    }

    #[test]
    fn footer_for_unpaginated_response_counts_filtered_jobs() {
        let mut view = JobBoardView::new(20, SortField::Title);
        view.set_tag_filter("life");
        let ticket = view.begin_load();
        view.finish_load::<()>(
            &ticket,
            Ok(JobPage {
                jobs: vec![job("1", "Actuary", &["life"]), job("2", "Analyst", &[])],
                paging: Paging::Unpaginated,
            }),
        );

        assert_eq!(
            footer(&view),
            "Showing 1 of 2 jobs (not paginated by the server)"
        );
    }

    #[test]
    fn json_wraps_jobs_with_pagination() {
        let view = JobBoardView::new(5, SortField::Title);
        let value: serde_json::Value = serde_json::from_str(&render_json(&view).unwrap()).unwrap();

        assert_eq!(value["jobs"], json!([]));
        assert_eq!(value["pagination"]["limit"], 5);
        assert_eq!(value["pagination"]["total_jobs"], serde_json::Value::Null);
    }
}
