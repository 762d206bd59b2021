//! Line-for-line HLS manifest rewriting.
//!
//! Every resource reference in a playlist is replaced by a relay URL that
//! re-enters `/api/proxy`, so variant playlists and segments are fetched
//! through the same relay as the manifest. The transform never adds, drops or
//! reorders lines: media sequence numbers and discontinuity counters on the
//! player side stay aligned with the origin.
//!
//! Directive lines (`#...`) are kept verbatim, including any `URI="..."`
//! attributes they carry. Those attribute URIs are not proxied; the rewriter
//! only reports them in a debug log.

use std::borrow::Cow;
use tracing::debug;
use url::Url;

/// Path of the relay endpoint that rewritten references point back to.
pub const RELAY_PATH: &str = "/api/proxy";

/// Build the relay URL for an absolute target.
pub fn relay_url(target: &str) -> String {
    format!("{}?url={}", RELAY_PATH, urlencoding::encode(target))
}

/// One playlist line, classified by its first matching rule.
///
/// Rules are tried in declaration order; the first match wins. In particular
/// a directive is never treated as a bare reference, even when its
/// attributes mention `.ts` or `.m3u8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestLine<'a> {
    /// Empty after trimming
    Blank,
    /// Starts with `#`: tags and comments
    Directive(&'a str),
    /// Starts with `http://` or `https://`
    Absolute(&'a str),
    /// Starts with `/`
    RootRelative(&'a str),
    /// Starts with `./` or `../`
    Relative(&'a str),
    /// Any other line mentioning `.ts` or `.m3u8`, e.g. `seg1.ts`
    BareReference(&'a str),
    /// Everything else, passed through
    Unclassified(&'a str),
}

impl<'a> ManifestLine<'a> {
    /// Classify a raw line. Surrounding whitespace is trimmed first.
    pub fn classify(raw: &'a str) -> Self {
        let line = raw.trim();

        if line.is_empty() {
            ManifestLine::Blank
        } else if line.starts_with('#') {
            ManifestLine::Directive(line)
        } else if line.starts_with("http://") || line.starts_with("https://") {
            ManifestLine::Absolute(line)
        } else if line.starts_with('/') {
            ManifestLine::RootRelative(line)
        } else if line.starts_with("./") || line.starts_with("../") {
            ManifestLine::Relative(line)
        } else if line.contains(".ts") || line.contains(".m3u8") {
            ManifestLine::BareReference(line)
        } else {
            ManifestLine::Unclassified(line)
        }
    }

    /// True for lines that are rewritten into relay URLs.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            ManifestLine::Absolute(_)
                | ManifestLine::RootRelative(_)
                | ManifestLine::Relative(_)
                | ManifestLine::BareReference(_)
        )
    }

    /// Produce the output line. `base` is the manifest's own absolute URL.
    ///
    /// Resolution failures fail open: the trimmed line is emitted unchanged.
    pub fn rewrite(self, base: &Url) -> Cow<'a, str> {
        match self {
            ManifestLine::Blank => Cow::Borrowed(""),
            ManifestLine::Directive(line) | ManifestLine::Unclassified(line) => {
                Cow::Borrowed(line)
            }
            ManifestLine::Absolute(line) => Cow::Owned(relay_url(line)),
            ManifestLine::RootRelative(path) => {
                let absolute = format!("{}{}", base.origin().ascii_serialization(), path);
                Cow::Owned(relay_url(&absolute))
            }
            ManifestLine::Relative(line) | ManifestLine::BareReference(line) => {
                match base.join(line) {
                    Ok(resolved) => Cow::Owned(relay_url(resolved.as_str())),
                    Err(e) => {
                        debug!("Keeping unresolvable playlist line {:?}: {}", line, e);
                        Cow::Borrowed(line)
                    }
                }
            }
        }
    }
}

/// Rewrite a whole manifest against its own URL.
///
/// Lines are split on `\n` and re-joined with `\n`, so the output has exactly
/// as many lines as the input.
pub fn rewrite_manifest(content: &str, base: &Url) -> String {
    let mut rewritten = 0usize;
    let mut uri_directives = 0usize;

    let lines: Vec<Cow<'_, str>> = content
        .split('\n')
        .map(|raw| {
            let line = ManifestLine::classify(raw);
            if line.is_reference() {
                rewritten += 1;
            } else if let ManifestLine::Directive(tag) = line
                && tag.contains("URI=")
            {
                uri_directives += 1;
            }
            line.rewrite(base)
        })
        .collect();

    debug!(
        "Rewrote {} of {} playlist lines for {}{}",
        rewritten,
        lines.len(),
        base.host_str().unwrap_or_default(),
        base.path()
    );
    if uri_directives > 0 {
        debug!(
            "{} directive line(s) carry URI attributes that are passed through unproxied",
            uri_directives
        );
    }
    crate::metrics::record_lines_rewritten(rewritten);

    lines.join("\n")
}
