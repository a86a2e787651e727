//! Extensions marketplace backed by a fixed mock catalogue.
//!
//! Installing only flips a flag; nothing is downloaded or executed.

#[derive(Debug, Clone, PartialEq)]
pub struct Extension {
    pub id: &'static str,
    pub name: &'static str,
    pub publisher: &'static str,
    pub description: &'static str,
    pub version: &'static str,
    pub downloads: u64,
    /// Average rating out of 5.
    pub rating: f32,
    pub installed: bool,
}

#[allow(clippy::too_many_arguments)]
const fn ext(
    id: &'static str,
    name: &'static str,
    publisher: &'static str,
    description: &'static str,
    version: &'static str,
    downloads: u64,
    rating: f32,
    installed: bool,
) -> Extension {
    Extension {
        id,
        name,
        publisher,
        description,
        version,
        downloads,
        rating,
        installed,
    }
}

const CATALOGUE: &[Extension] = &[
    ext("ms-python.python", "Python", "Microsoft", "IntelliSense, linting and debugging for Python", "2024.2.1", 112_400_000, 4.5, false),
    ext("esbenp.prettier-vscode", "Prettier - Code formatter", "Prettier", "Code formatter using prettier", "10.1.0", 38_900_000, 4.0, true),
    ext("dbaeumer.vscode-eslint", "ESLint", "Microsoft", "Integrates ESLint JavaScript into the editor", "2.4.4", 31_200_000, 4.3, true),
    ext("rust-lang.rust-analyzer", "rust-analyzer", "The Rust Programming Language", "Rust language support", "0.3.1850", 4_100_000, 4.8, false),
    ext("eamodio.gitlens", "GitLens", "GitKraken", "Supercharge Git inside the editor", "14.8.2", 29_700_000, 4.6, false),
    ext("ritwickdey.liveserver", "Live Server", "Ritwick Dey", "Launch a local development server with live reload", "5.7.9", 45_300_000, 4.4, false),
    ext("pkief.material-icon-theme", "Material Icon Theme", "Philipp Kief", "Material Design icons for the file explorer", "4.34.0", 21_800_000, 4.9, false),
    ext("golang.go", "Go", "Go Team at Google", "Rich Go language support", "0.41.1", 11_300_000, 4.4, false),
    ext("redhat.vscode-yaml", "YAML", "Red Hat", "YAML language support with schema validation", "1.14.0", 18_600_000, 4.2, false),
    ext("streetsidesoftware.code-spell-checker", "Code Spell Checker", "Street Side Software", "Spelling checker for source code", "3.0.1", 9_800_000, 4.6, false),
];

/// Which subset of the catalogue the panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtensionFilter {
    #[default]
    Marketplace,
    Installed,
}

/// The marketplace catalogue with per-session install state.
#[derive(Debug, Clone)]
pub struct Marketplace {
    extensions: Vec<Extension>,
}

impl Default for Marketplace {
    fn default() -> Self {
        Self {
            extensions: CATALOGUE.to_vec(),
        }
    }
}

impl Marketplace {
    /// Extensions matching `query` (case-insensitive, against name,
    /// publisher, description and id), most downloaded first.
    pub fn filter(&self, query: &str, filter: ExtensionFilter) -> Vec<&Extension> {
        let q = query.trim().to_lowercase();
        let mut out: Vec<&Extension> = self
            .extensions
            .iter()
            .filter(|e| filter == ExtensionFilter::Marketplace || e.installed)
            .filter(|e| {
                q.is_empty()
                    || e.name.to_lowercase().contains(&q)
                    || e.publisher.to_lowercase().contains(&q)
                    || e.description.to_lowercase().contains(&q)
                    || e.id.contains(&q)
            })
            .collect();
        out.sort_by(|a, b| b.downloads.cmp(&a.downloads));
        out
    }

    /// Flip the installed flag.  Returns the new state, or `None` for an
    /// unknown id.
    pub fn toggle_install(&mut self, id: &str) -> Option<bool> {
        let ext = self.extensions.iter_mut().find(|e| e.id == id)?;
        ext.installed = !ext.installed;
        tracing::info!(
            "{} {}",
            if ext.installed { "installed" } else { "uninstalled" },
            ext.id
        );
        Some(ext.installed)
    }

    pub fn installed_count(&self) -> usize {
        self.extensions.iter().filter(|e| e.installed).count()
    }
}

/// Compact download count, e.g. `112.4M`, `9.8M`, `950K`.
pub fn format_downloads(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{}K", n / 1_000)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_lists_everything_by_downloads() {
        let m = Marketplace::default();
        let all = m.filter("", ExtensionFilter::Marketplace);
        assert_eq!(all.len(), CATALOGUE.len());
        assert_eq!(all[0].id, "ms-python.python");
        assert!(all.windows(2).all(|w| w[0].downloads >= w[1].downloads));
    }

    #[test]
    fn query_matches_publisher_case_insensitively() {
        let m = Marketplace::default();
        let ms = m.filter("MICROSOFT", ExtensionFilter::Marketplace);
        let ids: Vec<&str> = ms.iter().map(|e| e.id).collect();
        assert_eq!(ids, ["ms-python.python", "dbaeumer.vscode-eslint"]);
    }

    #[test]
    fn install_toggle_updates_installed_view() {
        let mut m = Marketplace::default();
        let before = m.installed_count();
        assert_eq!(m.toggle_install("golang.go"), Some(true));
        assert_eq!(m.installed_count(), before + 1);
        assert!(m
            .filter("", ExtensionFilter::Installed)
            .iter()
            .any(|e| e.id == "golang.go"));
        assert_eq!(m.toggle_install("golang.go"), Some(false));
        assert_eq!(m.toggle_install("nope"), None);
    }

    #[test]
    fn download_formatting() {
        assert_eq!(format_downloads(112_400_000), "112.4M");
        assert_eq!(format_downloads(950_000), "950K");
        assert_eq!(format_downloads(12), "12");
    }
}
