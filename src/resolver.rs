use std::fmt;

use crate::menu::CommandTag;

/// Paths selected in Explorer, in the order the shell reported them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    paths: Vec<String>,
}

impl Selection {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// First path that is not empty or whitespace.
    pub fn first_usable(&self) -> Option<&str> {
        self.paths
            .iter()
            .map(String::as_str)
            .find(|path| !path.trim().is_empty())
    }
}

impl<S: Into<String>> FromIterator<S> for Selection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// The target path and tolerance handed to the cropper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub path: String,
    pub tolerance: u32,
}

impl LaunchRequest {
    /// Argument vector in the order the cropper expects: `-t <tolerance> <path>`.
    pub fn args(&self) -> Vec<String> {
        vec!["-t".to_string(), self.tolerance.to_string(), self.path.clone()]
    }
}

impl fmt::Display for LaunchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-t {} {}", self.tolerance, self.path)
    }
}

/// Everything one invocation needs: the selection travels with the command instead of
/// being cached on the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeRequest {
    pub selection: Selection,
    pub tag: CommandTag,
}

impl InvokeRequest {
    pub fn new(selection: Selection, tag: CommandTag) -> Self {
        Self { selection, tag }
    }

    pub fn resolve(&self) -> Option<LaunchRequest> {
        resolve(&self.selection, self.tag)
    }
}

/// Pick the first non-blank path and the tolerance belonging to `tag`.
///
/// Returns `None` when nothing usable is selected; the caller then does nothing.
pub fn resolve(selection: &Selection, tag: CommandTag) -> Option<LaunchRequest> {
    let path = selection.first_usable()?;
    Some(LaunchRequest {
        path: path.to_string(),
        tolerance: tag.tolerance(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::TOLERANCES;

    #[test]
    fn test_root_uses_first_path_and_default_tolerance() {
        let selection = Selection::new(["C:\\img1.png", "", "C:\\img2.png"]);
        let request = resolve(&selection, CommandTag::Root).unwrap();

        assert_eq!(request.path, "C:\\img1.png");
        assert_eq!(request.tolerance, 100);
        assert_eq!(request.args(), vec!["-t", "100", "C:\\img1.png"]);
    }

    #[test]
    fn test_blank_entries_are_skipped() {
        let selection = Selection::new(["", "   ", "\t", "D:\\photos\\a.jpg", "D:\\b.jpg"]);
        let request = resolve(&selection, CommandTag::Tolerance(150)).unwrap();

        assert_eq!(request.path, "D:\\photos\\a.jpg");
        assert_eq!(request.args(), vec!["-t", "150", "D:\\photos\\a.jpg"]);
    }

    #[test]
    fn test_empty_selection_yields_nothing() {
        for value in TOLERANCES {
            assert!(resolve(&Selection::empty(), CommandTag::Tolerance(value)).is_none());
        }
        assert!(resolve(&Selection::empty(), CommandTag::Root).is_none());
    }

    #[test]
    fn test_all_blank_selection_yields_nothing() {
        let selection = Selection::new(["", " ", "\r\n"]);
        assert!(resolve(&selection, CommandTag::Root).is_none());
        // Blank paths still count as a selection for menu state
        assert_eq!(selection.len(), 3);
    }

    #[test]
    fn test_each_tolerance_is_forwarded() {
        let selection = Selection::new(["C:\\x.png"]);
        for value in TOLERANCES {
            let request = resolve(&selection, CommandTag::Tolerance(value)).unwrap();
            let args = request.args();
            assert_eq!(args[0], "-t");
            assert_eq!(args[1], value.to_string());
            assert_eq!(args[2], "C:\\x.png");
        }
    }

    #[test]
    fn test_invoke_request_carries_selection() {
        let request = InvokeRequest::new(
            ["", "E:\\scan.tiff"].into_iter().collect(),
            CommandTag::Tolerance(200),
        );
        let launch = request.resolve().unwrap();
        assert_eq!(launch.to_string(), "-t 200 E:\\scan.tiff");
    }

    #[test]
    fn test_paths_keep_original_order() {
        let selection = Selection::new(["b", "a", "c"]);
        assert_eq!(selection.paths(), ["b", "a", "c"]);
        assert_eq!(selection.first_usable(), Some("b"));
    }
}
