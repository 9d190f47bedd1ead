//! Configuration schema for corpusdash
//!
//! Every field is optional; the accessors supply the defaults.

use corpusdash_core::DEFAULT_STATCODES;
use facet::Facet;

/// Pages shown when the configuration lists none.
pub const DEFAULT_PAGES: &[&str] = &["plot", "samples", "tokens", "context"];

/// Default for every threshold.
pub const DEFAULT_THRESHOLD: f64 = 0.1;

/// Root configuration for corpusdash
#[derive(Debug, Clone, Default, Facet)]
pub struct Config {
    /// Statistics offered in the stat menu, in menu order
    #[facet(default)]
    pub statcodes: Option<Vec<String>>,

    /// Known page codes; the first is the default page
    #[facet(default)]
    pub pages: Option<Vec<String>>,

    /// Results with a side fraction above this are typical
    #[facet(default)]
    pub p_threshold: Option<f64>,

    /// Significant results with an FDR up to this are interesting
    #[facet(default)]
    pub fdr_threshold: Option<f64>,

    /// Points with a side fraction below this get a triangle marker
    #[facet(default)]
    pub triangle_threshold: Option<f64>,
}

impl Config {
    pub fn statcodes(&self) -> Vec<String> {
        match &self.statcodes {
            Some(codes) => codes.clone(),
            None => DEFAULT_STATCODES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn pages(&self) -> Vec<String> {
        match &self.pages {
            Some(pages) => pages.clone(),
            None => DEFAULT_PAGES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn p_threshold(&self) -> f64 {
        self.p_threshold.unwrap_or(DEFAULT_THRESHOLD)
    }

    pub fn fdr_threshold(&self) -> f64 {
        self.fdr_threshold.unwrap_or(DEFAULT_THRESHOLD)
    }

    pub fn triangle_threshold(&self) -> f64 {
        self.triangle_threshold.unwrap_or(DEFAULT_THRESHOLD)
    }
}
