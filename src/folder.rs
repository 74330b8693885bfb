use std::{
    io,
    path::{Path, PathBuf},
};

use log::{debug, info};

use crate::error::{Error, Result};

/// Sorted list of the images in one directory plus the one being shown.
#[derive(Debug)]
pub struct ImageFolder {
    root: PathBuf,
    files: Vec<PathBuf>,
    index: Option<usize>,
}

impl ImageFolder {
    pub fn open(root: impl Into<PathBuf>, extensions: &[String]) -> Result<Self> {
        let root = root.into();
        let files = scan(&root, extensions)?;
        info!("Found {} images in {}", files.len(), root.display());
        Ok(Self::from_files(root, files))
    }

    pub fn from_files(root: PathBuf, files: Vec<PathBuf>) -> Self {
        let index = (!files.is_empty()).then_some(0);
        Self { root, files, index }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn current(&self) -> Option<&Path> {
        self.files.get(self.index?).map(PathBuf::as_path)
    }

    pub fn has_previous(&self) -> bool {
        matches!(self.index, Some(i) if i > 0)
    }

    pub fn has_next(&self) -> bool {
        matches!(self.index, Some(i) if i + 1 < self.files.len())
    }

    pub fn previous(&mut self) -> bool {
        if !self.has_previous() {
            return false;
        }
        self.index = self.index.map(|i| i - 1);
        true
    }

    pub fn next(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.index = self.index.map(|i| i + 1);
        true
    }

    /// Moves to the first image after the current one matching `pred`.
    pub fn next_where(&mut self, mut pred: impl FnMut(&Path) -> bool) -> bool {
        let Some(start) = self.index else {
            return false;
        };
        match self.files[start + 1..].iter().position(|p| pred(p.as_path())) {
            Some(offset) => {
                self.index = Some(start + 1 + offset);
                true
            }
            None => false,
        }
    }

    /// Forgets the current image. The following image takes its place, or
    /// the last one if it was at the end.
    pub fn remove_current(&mut self) -> Option<PathBuf> {
        let index = self.index?;
        let removed = self.files.remove(index);
        self.index = match self.files.len() {
            0 => None,
            len => Some(index.min(len - 1)),
        };
        Some(removed)
    }

    /// Deletes the current image from disk, then from the list.
    pub fn delete_current(&mut self) -> Result<PathBuf> {
        let path = self.current().ok_or(Error::NoImage)?.to_path_buf();
        match std::fs::remove_file(&path) {
            Ok(()) => info!("Deleted {}", path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("{} already gone", path.display())
            }
            Err(e) => return Err(Error::io(&path)(e)),
        }
        self.remove_current();
        Ok(path)
    }

    pub fn counter_label(&self) -> String {
        let current = self.index.map_or(0, |i| i + 1);
        format!("Image: {current}/{}", self.files.len())
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
}

/// Non-recursive, sorted listing of the files with one of `extensions`.
pub fn scan(root: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(root).map_err(Error::io(root))? {
        let path = entry.map_err(Error::io(root))?.path();
        if path.is_file() && has_extension(&path, extensions) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn folder_with(names: &[&str]) -> (tempfile::TempDir, ImageFolder) {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        let folder = ImageFolder::open(dir.path(), &Config::default().extensions).unwrap();
        (dir, folder)
    }

    fn names(folder: &ImageFolder) -> Vec<String> {
        folder
            .files()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn scan_filters_and_sorts() {
        let (dir, folder) = folder_with(&["b.PNG", "a.jpg", "notes.txt", "c.Jpeg", "d.bmp"]);
        assert_eq!(names(&folder), ["a.jpg", "b.PNG", "c.Jpeg", "d.bmp"]);
        assert_eq!(folder.index(), Some(0));
        assert_eq!(folder.counter_label(), "Image: 1/4");

        std::fs::create_dir(dir.path().join("sub.png")).unwrap();
        let rescanned = scan(dir.path(), &Config::default().extensions).unwrap();
        assert_eq!(rescanned, folder.files());
    }

    #[test]
    fn empty_folder_has_no_current() {
        let (_dir, mut folder) = folder_with(&["readme.md"]);
        assert!(folder.current().is_none());
        assert!(!folder.next());
        assert!(!folder.previous());
        assert_eq!(folder.counter_label(), "Image: 0/0");
        assert!(matches!(folder.delete_current(), Err(Error::NoImage)));
    }

    #[test]
    fn navigation_stops_at_both_ends() {
        let (_dir, mut folder) = folder_with(&["a.png", "b.png", "c.png"]);
        assert!(!folder.has_previous());
        assert!(!folder.previous());
        assert!(folder.next());
        assert!(folder.next());
        assert!(!folder.has_next());
        assert!(!folder.next());
        assert_eq!(folder.index(), Some(2));
        assert!(folder.previous());
        assert_eq!(folder.counter_label(), "Image: 2/3");
    }

    #[test]
    fn next_where_skips_forward_only() {
        let (_dir, mut folder) = folder_with(&["a.png", "b.png", "c.png", "d.png"]);
        let is_c_or_a = |p: &Path| p.ends_with("c.png") || p.ends_with("a.png");
        assert!(folder.next_where(is_c_or_a));
        assert_eq!(folder.index(), Some(2));
        assert!(!folder.next_where(is_c_or_a));
        assert_eq!(folder.index(), Some(2));
    }

    #[test]
    fn removing_moves_to_following_then_last() {
        let (_dir, mut folder) = folder_with(&["a.png", "b.png", "c.png"]);
        folder.next();
        folder.remove_current();
        assert_eq!(folder.current().unwrap().file_name().unwrap(), "c.png");

        folder.remove_current();
        assert_eq!(folder.current().unwrap().file_name().unwrap(), "a.png");

        folder.remove_current();
        assert_eq!(folder.index(), None);
        assert_eq!(folder.remove_current(), None);
    }

    #[test]
    fn delete_removes_file_and_entry() {
        let (dir, mut folder) = folder_with(&["a.png", "b.png"]);
        let deleted = folder.delete_current().unwrap();
        assert_eq!(deleted, dir.path().join("a.png"));
        assert!(!deleted.exists());
        assert_eq!(names(&folder), ["b.png"]);
        assert_eq!(folder.counter_label(), "Image: 1/1");
    }

    #[test]
    fn delete_of_vanished_file_still_advances() {
        let (dir, mut folder) = folder_with(&["a.png", "b.png"]);
        std::fs::remove_file(dir.path().join("a.png")).unwrap();
        folder.delete_current().unwrap();
        assert_eq!(names(&folder), ["b.png"]);
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ImageFolder::open(dir.path().join("nope"), &Config::default().extensions);
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
