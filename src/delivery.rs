//! # Output Delivery
//!
//! Turns composed PDF bytes into something the user ends up holding. Three
//! strategies sit behind one [`DeliveryStrategy`] trait:
//!
//! - [`AutoDownload`] saves the file straight into a download directory.
//! - [`GestureGatedLink`] stages the file and waits for an explicit user
//!   gesture ([`DeliveryStrategy::activate`]) before saving it. Mobile
//!   browsers block downloads that are not triggered by a tap.
//! - [`NativeShare`] hands the staged file to a platform share sheet.
//!
//! [`select_strategy`] is the only place that picks between them.
//!
//! Staged files are `tempfile` handles. They are removed when the link is
//! activated, when it outlives its time-to-live, or when the strategy is
//! dropped, whichever comes first.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::model::LabelRecord;

/// How long a gesture-gated link stays valid by default.
///
/// There is no timer behind it. Expiry is checked whenever the link is
/// looked at, activated, replaced or dropped.
pub const DEFAULT_LINK_TTL: Duration = Duration::from_secs(60);

const FALLBACK_NAME: &str = "artwork";
const FORBIDDEN_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Serialized PDF bytes on their way to the user.
#[derive(Clone, PartialEq, Eq)]
pub struct PdfDocument {
    pub bytes: Vec<u8>,
}

impl PdfDocument {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PdfDocument({} bytes)", self.bytes.len())
    }
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The strategy cannot run here. The document comes back untouched so
    /// the caller can retry or deliver it another way.
    #[error("Delivery is not supported: {reason}")]
    Unsupported { reason: String, document: PdfDocument },
    /// The staged link outlived its time-to-live before the user acted.
    #[error("The download link has expired, export the PDF again")]
    Expired,
    #[error("Nothing is waiting for a user gesture")]
    NothingStaged,
    #[error("I/O error during delivery: {0}")]
    Io(#[from] std::io::Error),
}

impl DeliveryError {
    /// Recover the document from a recoverable failure.
    pub fn into_document(self) -> Option<PdfDocument> {
        match self {
            DeliveryError::Unsupported { document, .. } => Some(document),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The file was written to `path`.
    Saved { path: PathBuf },
    /// The file is staged and waits for [`DeliveryStrategy::activate`].
    AwaitingGesture { filename: String, expires_in: Duration },
    /// The share sheet completed.
    Shared,
    /// The user dismissed the share sheet. Not an error.
    ShareCancelled,
}

pub trait DeliveryStrategy {
    fn name(&self) -> &'static str;

    fn deliver(
        &mut self,
        document: PdfDocument,
        filename: &str,
    ) -> Result<DeliveryOutcome, DeliveryError>;

    /// Complete a pending delivery after a user gesture. Strategies that
    /// never wait have nothing to complete.
    fn activate(&mut self) -> Result<DeliveryOutcome, DeliveryError> {
        Err(DeliveryError::NothingStaged)
    }
}

/// Replace characters that are invalid in file names and ensure a `.pdf`
/// extension. Blank names become `artwork.pdf`.
pub fn sanitize_filename(name: &str) -> String {
    let name = if name.trim().is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        name.chars()
            .map(|c| if FORBIDDEN_CHARS.contains(&c) { '_' } else { c })
            .collect()
    };
    if name.ends_with(".pdf") {
        name
    } else {
        format!("{}.pdf", name)
    }
}

/// Pick an output name: the uploaded file's stem, else the label title,
/// else `artwork`.
pub fn suggested_filename(original_file_name: Option<&str>, label: Option<&LabelRecord>) -> String {
    let stem = original_file_name
        .map(file_stem)
        .filter(|s| !s.trim().is_empty());
    let title = label
        .map(|l| l.title.as_str())
        .filter(|s| !s.trim().is_empty());
    sanitize_filename(stem.or(title).unwrap_or(FALLBACK_NAME))
}

fn file_stem(name: &str) -> &str {
    // Browsers hand over bare names, but paths can come in from the CLI
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match base.rfind('.') {
        Some(0) | None => base,
        Some(dot) => &base[..dot],
    }
}

fn save_into(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf, DeliveryError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(sanitize_filename(filename));
    fs::write(&path, bytes)?;
    Ok(path)
}

fn stage(document: &PdfDocument, dir: Option<&Path>) -> Result<NamedTempFile, DeliveryError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("zcat-").suffix(".pdf");
    let mut file = match dir {
        Some(dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };
    file.write_all(&document.bytes)?;
    file.flush()?;
    Ok(file)
}

// ── AutoDownload ────────────────────────────────────────────────

/// Saves the file immediately.
#[derive(Debug, Clone)]
pub struct AutoDownload {
    dir: PathBuf,
}

impl AutoDownload {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DeliveryStrategy for AutoDownload {
    fn name(&self) -> &'static str {
        "auto-download"
    }

    fn deliver(
        &mut self,
        document: PdfDocument,
        filename: &str,
    ) -> Result<DeliveryOutcome, DeliveryError> {
        let path = save_into(&self.dir, filename, &document.bytes)?;
        log::info!("Saved {} ({} bytes)", path.display(), document.len());
        Ok(DeliveryOutcome::Saved { path })
    }
}

// ── GestureGatedLink ────────────────────────────────────────────

struct StagedLink {
    file: NamedTempFile,
    filename: String,
    staged_at: Instant,
}

/// Stages the file and saves it only when the user acts on the link.
pub struct GestureGatedLink {
    dir: PathBuf,
    ttl: Duration,
    staged: Option<StagedLink>,
}

impl GestureGatedLink {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
            staged: None,
        }
    }

    pub fn is_staged(&mut self) -> bool {
        self.release_expired();
        self.staged.is_some()
    }

    /// Path of the staged handle, while there is one.
    pub fn staged_path(&mut self) -> Option<&Path> {
        self.release_expired();
        self.staged.as_ref().map(|s| s.file.path())
    }

    /// Drop the staged handle if its time-to-live has passed. Returns
    /// whether anything was released.
    pub fn release_expired(&mut self) -> bool {
        let expired = self
            .staged
            .as_ref()
            .is_some_and(|s| s.staged_at.elapsed() >= self.ttl);
        if expired {
            log::debug!("Releasing expired staged link");
            self.staged = None;
        }
        expired
    }
}

impl fmt::Debug for GestureGatedLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureGatedLink")
            .field("dir", &self.dir)
            .field("ttl", &self.ttl)
            .field("staged", &self.staged.as_ref().map(|s| &s.filename))
            .finish()
    }
}

impl DeliveryStrategy for GestureGatedLink {
    fn name(&self) -> &'static str {
        "gesture-gated-link"
    }

    fn deliver(
        &mut self,
        document: PdfDocument,
        filename: &str,
    ) -> Result<DeliveryOutcome, DeliveryError> {
        // A new export replaces any link that is still pending
        self.staged = None;
        let file = stage(&document, None)?;
        let filename = sanitize_filename(filename);
        log::debug!("Staged {} at {}", filename, file.path().display());
        self.staged = Some(StagedLink {
            file,
            filename: filename.clone(),
            staged_at: Instant::now(),
        });
        Ok(DeliveryOutcome::AwaitingGesture {
            filename,
            expires_in: self.ttl,
        })
    }

    fn activate(&mut self) -> Result<DeliveryOutcome, DeliveryError> {
        if self.release_expired() {
            return Err(DeliveryError::Expired);
        }
        // The link stays staged until the copy succeeds, so a failed save
        // can be retried
        let staged = self.staged.as_ref().ok_or(DeliveryError::NothingStaged)?;
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(&staged.filename);
        fs::copy(staged.file.path(), &path)?;
        self.staged = None;
        log::info!("Saved {} after user gesture", path.display());
        Ok(DeliveryOutcome::Saved { path })
    }
}

// ── NativeShare ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    Cancelled,
}

/// A platform share sheet.
pub trait ShareTarget {
    fn is_available(&self) -> bool;

    /// Offer the file at `path` under `filename`.
    fn share(&mut self, path: &Path, filename: &str) -> std::io::Result<ShareOutcome>;
}

/// Hands the document to a [`ShareTarget`].
pub struct NativeShare {
    target: Box<dyn ShareTarget>,
    staging_dir: Option<PathBuf>,
}

impl NativeShare {
    pub fn new(target: Box<dyn ShareTarget>) -> Self {
        Self {
            target,
            staging_dir: None,
        }
    }

    /// Stage shared files in `dir` instead of the system temp directory.
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }
}

impl fmt::Debug for NativeShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeShare")
            .field("available", &self.target.is_available())
            .finish()
    }
}

impl DeliveryStrategy for NativeShare {
    fn name(&self) -> &'static str {
        "native-share"
    }

    fn deliver(
        &mut self,
        document: PdfDocument,
        filename: &str,
    ) -> Result<DeliveryOutcome, DeliveryError> {
        if !self.target.is_available() {
            return Err(DeliveryError::Unsupported {
                reason: "no share target is available".to_string(),
                document,
            });
        }

        let staged = match stage(&document, self.staging_dir.as_deref()) {
            Ok(file) => file,
            Err(e) => {
                log::warn!("Could not stage {} for sharing: {}", filename, e);
                return Err(DeliveryError::Unsupported {
                    reason: format!("could not stage the file: {}", e),
                    document,
                });
            }
        };
        let filename = sanitize_filename(filename);
        match self.target.share(staged.path(), &filename) {
            Ok(ShareOutcome::Shared) => Ok(DeliveryOutcome::Shared),
            Ok(ShareOutcome::Cancelled) => {
                log::debug!("Share of {} cancelled by the user", filename);
                Ok(DeliveryOutcome::ShareCancelled)
            }
            Err(e) => {
                log::warn!("Share target failed: {}", e);
                Err(DeliveryError::Unsupported {
                    reason: e.to_string(),
                    document,
                })
            }
        }
    }
}

// ── Strategy selection ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Desktop,
    Mobile,
}

const MOBILE_MARKERS: [&str; 8] = [
    "Android",
    "iPhone",
    "iPad",
    "iPod",
    "Mobile",
    "IEMobile",
    "Opera Mini",
    "BlackBerry",
];

impl Platform {
    pub fn from_user_agent(user_agent: &str) -> Self {
        if MOBILE_MARKERS.iter().any(|m| user_agent.contains(m)) {
            Platform::Mobile
        } else {
            Platform::Desktop
        }
    }
}

/// What [`select_strategy`] may use.
pub struct DeliveryOptions {
    pub download_dir: PathBuf,
    pub share_target: Option<Box<dyn ShareTarget>>,
    pub link_ttl: Duration,
}

impl DeliveryOptions {
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
            share_target: None,
            link_ttl: DEFAULT_LINK_TTL,
        }
    }

    pub fn with_share_target(mut self, target: Box<dyn ShareTarget>) -> Self {
        self.share_target = Some(target);
        self
    }

    pub fn with_link_ttl(mut self, ttl: Duration) -> Self {
        self.link_ttl = ttl;
        self
    }
}

pub fn select_strategy(platform: Platform, options: DeliveryOptions) -> Box<dyn DeliveryStrategy> {
    let DeliveryOptions {
        download_dir,
        share_target,
        link_ttl,
    } = options;

    match (platform, share_target) {
        (Platform::Desktop, _) => Box::new(AutoDownload::new(download_dir)),
        (Platform::Mobile, Some(target)) if target.is_available() => {
            Box::new(NativeShare::new(target))
        }
        (Platform::Mobile, _) => Box::new(GestureGatedLink::new(download_dir, link_ttl)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const ANDROID_UA: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 \
                              (KHTML, like Gecko) Chrome/126.0 Mobile Safari/537.36";
    const MAC_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_5) AppleWebKit/605.1.15 \
                          (KHTML, like Gecko) Version/17.5 Safari/605.1.15";

    fn doc() -> PdfDocument {
        PdfDocument::new(b"%PDF-1.7\n%%EOF\n".to_vec())
    }

    struct FakeShare {
        available: bool,
        result: Option<ShareOutcome>,
        seen: Rc<RefCell<Vec<(PathBuf, String, bool)>>>,
    }

    impl ShareTarget for FakeShare {
        fn is_available(&self) -> bool {
            self.available
        }

        fn share(&mut self, path: &Path, filename: &str) -> std::io::Result<ShareOutcome> {
            self.seen
                .borrow_mut()
                .push((path.to_path_buf(), filename.to_string(), path.exists()));
            self.result
                .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "sheet crashed"))
        }
    }

    fn fake(available: bool, result: Option<ShareOutcome>) -> (Box<FakeShare>, Rc<RefCell<Vec<(PathBuf, String, bool)>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        (
            Box::new(FakeShare {
                available,
                result,
                seen: Rc::clone(&seen),
            }),
            seen,
        )
    }

    #[test]
    fn sanitize_replaces_forbidden_characters() {
        assert_eq!(sanitize_filename("a<b>c:d\"e/f\\g|h?i*j"), "a_b_c_d_e_f_g_h_i_j.pdf");
        assert_eq!(sanitize_filename("Закат"), "Закат.pdf");
    }

    #[test]
    fn sanitize_blank_and_extension() {
        assert_eq!(sanitize_filename(""), "artwork.pdf");
        assert_eq!(sanitize_filename("   "), "artwork.pdf");
        assert_eq!(sanitize_filename("label.pdf"), "label.pdf");
    }

    #[test]
    fn suggested_name_priority() {
        let label = LabelRecord {
            title: "Закат".to_string(),
            ..Default::default()
        };
        assert_eq!(suggested_filename(Some("IMG_0042.jpeg"), Some(&label)), "IMG_0042.pdf");
        assert_eq!(suggested_filename(Some("photos/sea.png"), None), "sea.pdf");
        assert_eq!(suggested_filename(None, Some(&label)), "Закат.pdf");
        assert_eq!(suggested_filename(Some(""), None), "artwork.pdf");
        assert_eq!(suggested_filename(None, None), "artwork.pdf");
    }

    #[test]
    fn file_stem_edge_cases() {
        assert_eq!(file_stem(".hidden"), ".hidden");
        assert_eq!(file_stem("a.b.c"), "a.b");
        assert_eq!(file_stem("C:\\pics\\x.webp"), "x");
    }

    #[test]
    fn platform_detection() {
        assert_eq!(Platform::from_user_agent(ANDROID_UA), Platform::Mobile);
        assert_eq!(Platform::from_user_agent(MAC_UA), Platform::Desktop);
        assert_eq!(Platform::from_user_agent(""), Platform::Desktop);
    }

    #[test]
    fn auto_download_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut strategy = AutoDownload::new(dir.path().join("downloads"));
        let outcome = strategy.deliver(doc(), "Закат").unwrap();
        let expected = dir.path().join("downloads").join("Закат.pdf");
        assert_eq!(outcome, DeliveryOutcome::Saved { path: expected.clone() });
        assert_eq!(fs::read(expected).unwrap(), doc().bytes);
    }

    #[test]
    fn gesture_link_saves_only_after_activation() {
        let dir = tempfile::tempdir().unwrap();
        let mut link = GestureGatedLink::new(dir.path(), Duration::from_secs(60));
        let outcome = link.deliver(doc(), "work").unwrap();
        assert!(matches!(outcome, DeliveryOutcome::AwaitingGesture { ref filename, .. } if filename == "work.pdf"));
        assert!(!dir.path().join("work.pdf").exists());

        let staged = link.staged_path().unwrap().to_path_buf();
        assert!(staged.exists());

        let outcome = link.activate().unwrap();
        assert_eq!(outcome, DeliveryOutcome::Saved { path: dir.path().join("work.pdf") });
        assert!(!staged.exists(), "staged handle must be released after activation");
        assert!(!link.is_staged());
        assert!(matches!(link.activate(), Err(DeliveryError::NothingStaged)));
    }

    #[test]
    fn gesture_link_expires() {
        let dir = tempfile::tempdir().unwrap();
        let mut link = GestureGatedLink::new(dir.path(), Duration::ZERO);
        link.deliver(doc(), "work").unwrap();
        assert!(matches!(link.activate(), Err(DeliveryError::Expired)));
        assert!(!link.is_staged());
        assert!(!dir.path().join("work.pdf").exists());
    }

    #[test]
    fn expired_link_is_released_when_inspected() {
        let dir = tempfile::tempdir().unwrap();
        let mut link = GestureGatedLink::new(dir.path(), Duration::from_millis(200));
        link.deliver(doc(), "work").unwrap();
        let staged = link.staged_path().unwrap().to_path_buf();
        assert!(staged.exists());

        std::thread::sleep(Duration::from_millis(400));
        assert!(link.staged_path().is_none());
        assert!(!staged.exists(), "expired handle must be removed on inspection");
        assert!(!link.is_staged());
    }

    #[test]
    fn failed_activation_keeps_link_for_retry() {
        let root = tempfile::tempdir().unwrap();
        let target = root.path().join("downloads");
        fs::write(&target, b"not a directory").unwrap();

        let mut link = GestureGatedLink::new(&target, DEFAULT_LINK_TTL);
        link.deliver(doc(), "work").unwrap();

        let err = link.activate().unwrap_err();
        assert!(matches!(err, DeliveryError::Io(_)), "{:?}", err);
        assert!(link.is_staged());
        let staged = link.staged_path().unwrap().to_path_buf();
        assert!(staged.exists());

        fs::remove_file(&target).unwrap();
        let outcome = link.activate().unwrap();
        let saved = target.join("work.pdf");
        assert_eq!(outcome, DeliveryOutcome::Saved { path: saved.clone() });
        assert_eq!(fs::read(saved).unwrap(), doc().bytes);
        assert!(!staged.exists());
    }

    #[test]
    fn gesture_link_released_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let staged = {
            let mut link = GestureGatedLink::new(dir.path(), DEFAULT_LINK_TTL);
            link.deliver(doc(), "work").unwrap();
            link.staged_path().unwrap().to_path_buf()
        };
        assert!(!staged.exists());
    }

    #[test]
    fn new_delivery_replaces_pending_link() {
        let dir = tempfile::tempdir().unwrap();
        let mut link = GestureGatedLink::new(dir.path(), DEFAULT_LINK_TTL);
        link.deliver(doc(), "first").unwrap();
        let first = link.staged_path().unwrap().to_path_buf();
        link.deliver(doc(), "second").unwrap();
        assert!(!first.exists());
        let outcome = link.activate().unwrap();
        assert_eq!(outcome, DeliveryOutcome::Saved { path: dir.path().join("second.pdf") });
    }

    #[test]
    fn native_share_hands_over_staged_file() {
        let (target, seen) = fake(true, Some(ShareOutcome::Shared));
        let mut share = NativeShare::new(target);
        assert_eq!(share.deliver(doc(), "Закат").unwrap(), DeliveryOutcome::Shared);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].1, "Закат.pdf");
        assert!(seen[0].2, "file must exist while the sheet is open");
        assert!(!seen[0].0.exists(), "staged file released afterwards");
    }

    #[test]
    fn native_share_cancel_is_not_an_error() {
        let (target, _) = fake(true, Some(ShareOutcome::Cancelled));
        let mut share = NativeShare::new(target);
        assert_eq!(share.deliver(doc(), "x").unwrap(), DeliveryOutcome::ShareCancelled);
    }

    #[test]
    fn native_share_unavailable_returns_document() {
        let (target, seen) = fake(false, Some(ShareOutcome::Shared));
        let mut share = NativeShare::new(target);
        let err = share.deliver(doc(), "x").unwrap_err();
        assert!(matches!(err, DeliveryError::Unsupported { .. }));
        assert_eq!(err.into_document(), Some(doc()));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn native_share_staging_failure_returns_document() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("staging");
        fs::write(&blocker, b"not a directory").unwrap();

        let (target, seen) = fake(true, Some(ShareOutcome::Shared));
        let mut share = NativeShare::new(target).with_staging_dir(&blocker);
        let err = share.deliver(doc(), "x").unwrap_err();
        assert!(matches!(err, DeliveryError::Unsupported { .. }), "{:?}", err);
        assert!(seen.borrow().is_empty());
        assert_eq!(err.into_document(), Some(doc()));
    }

    #[test]
    fn native_share_failure_is_recoverable() {
        let (target, _) = fake(true, None);
        let mut share = NativeShare::new(target);
        let err = share.deliver(doc(), "x").unwrap_err();
        assert!(err.to_string().contains("sheet crashed"));
        assert_eq!(err.into_document(), Some(doc()));
    }

    #[test]
    fn strategy_selection() {
        let dir = tempfile::tempdir().unwrap();

        let s = select_strategy(Platform::Desktop, DeliveryOptions::new(dir.path()));
        assert_eq!(s.name(), "auto-download");

        let s = select_strategy(Platform::Mobile, DeliveryOptions::new(dir.path()));
        assert_eq!(s.name(), "gesture-gated-link");

        let (target, _) = fake(true, Some(ShareOutcome::Shared));
        let s = select_strategy(
            Platform::Mobile,
            DeliveryOptions::new(dir.path()).with_share_target(target),
        );
        assert_eq!(s.name(), "native-share");

        let (target, _) = fake(false, None);
        let s = select_strategy(
            Platform::Mobile,
            DeliveryOptions::new(dir.path()).with_share_target(target),
        );
        assert_eq!(s.name(), "gesture-gated-link");

        let (target, _) = fake(true, Some(ShareOutcome::Shared));
        let s = select_strategy(
            Platform::Desktop,
            DeliveryOptions::new(dir.path()).with_share_target(target),
        );
        assert_eq!(s.name(), "auto-download");
    }

    #[test]
    fn auto_download_has_nothing_to_activate() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = AutoDownload::new(dir.path());
        assert!(matches!(s.activate(), Err(DeliveryError::NothingStaged)));
    }
}
