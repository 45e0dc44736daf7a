//! Migration driver.
//!
//! ```text
//! ┌────────────┐   ┌─────────────────┐   ┌─────────────┐   ┌────────┐
//! │ read tables│ → │ build indexes   │ → │ transform   │ → │ write  │
//! │  (source)  │   │ legacy, attach. │   │ per record  │   │        │
//! └────────────┘   └─────────────────┘   └─────────────┘   └────────┘
//! ```
//!
//! Records are processed one at a time in table order. The first fatal error
//! (expander failure, bad page id, I/O) stops the run.

pub mod transform;

use anyhow::{Context, Result};

use crate::config::MigrateConfig;
use crate::index::{AttachmentIndex, LegacyLinkIndex};
use crate::logger::ProgressLine;
use crate::source::{read_alias_table, read_attachments, read_nodes, read_redirect_table};
use crate::utils::plural::plural_count;
use crate::writer::DocumentWriter;
use crate::{debug, log};
use transform::{Expander, Transformer};

/// Counts reported at the end of a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub written: usize,
    /// Records with an empty body.
    pub skipped: usize,
    /// Documents written under a `-DUPLICATE` name.
    pub duplicates: usize,
}

impl Summary {
    fn report(&self) {
        log!(
            "done";
            "{} written, {} skipped, {}",
            plural_count(self.written, "document"),
            plural_count(self.skipped, "empty record"),
            plural_count(self.duplicates, "duplicate")
        );
    }
}

/// Run the whole migration.
pub fn run(config: &MigrateConfig) -> Result<Summary> {
    let writer = DocumentWriter::new(config.output_dir());
    writer.prepare()?;

    let input = &config.input;
    let aliases = read_alias_table(&config.input_path(&input.aliases))?;
    let redirects = read_redirect_table(&config.input_path(&input.redirects))?;
    let legacy = LegacyLinkIndex::build(&aliases, &redirects);
    debug!("index"; "{} with legacy links", plural_count(legacy.len(), "node"));

    let attachments = AttachmentIndex::build(&read_attachments(
        &config.input_path(&input.attachments),
    )?);

    let records = read_nodes(&config.input_path(&input.nodes))?;

    let domain = config.domain_regex()?;
    let expander = Expander::new(&config.transform.expander)?;
    let transformer = Transformer::new(&legacy, &attachments, expander, domain.as_ref());

    let progress = ProgressLine::new(&[("nodes", records.len())]);
    let mut summary = Summary::default();

    for record in &records {
        let document = transformer
            .transform(record)
            .with_context(|| format!("node {} ({})", record.id, record.title))?;

        match document {
            Some(document) => {
                let written = writer.write(&document)?;
                if written.duplicate {
                    summary.duplicates += 1;
                    log!("duplicate"; "{} exists, wrote {}", document.path.display(), written.path.display());
                }
                debug!("write"; "{}", written.path.display());
                summary.written += 1;
            }
            None => summary.skipped += 1,
        }
        progress.inc("nodes");
    }

    progress.finish();
    summary.report();
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    const HEADER: &str =
        "nid\ttype\ttitle\tstatus\tcreated\tchanged\tbody_value\tbody_format\ttags\tname\n";

    fn export(dir: &Path, nodes: &str) {
        fs::write(
            dir.join("url_alias.csv"),
            "node/1\tabout\ntaxonomy/term/3\ttags/rust\n",
        )
        .unwrap();
        fs::write(
            dir.join("redirects.csv"),
            "old-about\tnode/1\nhttp://other.example.com/x\tnode/2\n",
        )
        .unwrap();
        fs::write(dir.join("attachments.csv"), "2\tfiles/report.pdf\tReport\n").unwrap();
        fs::write(dir.join("nodes.csv"), format!("{HEADER}{nodes}")).unwrap();
    }

    fn config(input: &Path, output: &Path) -> MigrateConfig {
        let mut config = MigrateConfig::default();
        config.input.dir = input.to_path_buf();
        config.output.dir = output.to_path_buf();
        config.transform.expander = "cat".to_string();
        config.transform.domain_regex = Some(r"www\.example\.org".to_string());
        config
    }

    #[test]
    fn test_end_to_end() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        export(
            input.path(),
            concat!(
                "1\tpage\tAbout us\t1\t1584189000\t0\t<p>We are <a href=\"http://www.example.org/contact\">here</a>.</p>\t1\tNULL\t\n",
                "2\tstory\tFirst post\t0\t1584189000\t0\t\"<p><img src=\"\"/files/cat.jpg\"\" alt=\"\"Cat\"\"> One</p>\n<p>Two</p>\n<p>Three</p>\"\t3\trust,web\talice\n",
                "3\tstory\tEmpty\t1\t1584189000\t0\t\t1\tNULL\tbob\n",
            ),
        );

        let summary = run(&config(input.path(), output.path())).unwrap();
        assert_eq!(
            summary,
            Summary {
                written: 2,
                skipped: 1,
                duplicates: 0
            }
        );

        let page = fs::read_to_string(output.path().join("published/pages/about.md")).unwrap();
        assert!(page.starts_with("---\ntitle: About us\ndate: 2020-03-14 12:30:00\n"));
        assert!(page.contains("legacy-links:\n  - about\n  - old-about\n  - node/1\n---\n"));
        assert!(page.contains("(/contact)"));
        assert!(!page.contains("<!--more-->"));

        let post = fs::read_to_string(
            output
                .path()
                .join("unpublished/posts/2020-03-14-first-post.md"),
        )
        .unwrap();
        assert!(post.contains("author: alice\n"));
        assert!(post.contains("tags: [rust, web]\n"));
        assert!(post.contains("image: cat.jpg\n"));
        assert!(post.contains("image_alt: Cat\n"));
        assert!(post.contains("legacy-links:\n  - node/2\n"));
        assert!(post.contains("<!--more-->"));
        assert!(post.ends_with("Attachments:\n\n* [Report](/files/report.pdf)\n"));

        assert!(!output.path().join("published/posts").read_dir().unwrap().any(|_| true));
    }

    #[test]
    fn test_second_run_writes_duplicates() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        export(
            input.path(),
            "1\tpage\tAbout us\t1\t1584189000\t0\t<p>Hi</p>\t2\tNULL\t\n",
        );
        let config = config(input.path(), output.path());

        run(&config).unwrap();
        let summary = run(&config).unwrap();
        assert_eq!(summary.duplicates, 1);
        assert!(
            output
                .path()
                .join("published/pages/about-DUPLICATE.md")
                .is_file()
        );
    }

    #[test]
    fn test_expander_failure_stops_run() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        export(
            input.path(),
            "5\tstory\tT\t1\t1584189000\t0\t<p>x</p>\t1\tNULL\t\n",
        );
        let mut config = config(input.path(), output.path());
        config.transform.expander = "false".to_string();

        let err = run(&config).unwrap_err();
        assert!(format!("{err:#}").contains("node 5"));
    }
}
