//! Buffering of multipart dashboard forms.
//!
//! Product and project forms carry images, so they arrive as
//! `multipart/form-data`. The parts are read fully into memory and
//! forwarded to the backend unchanged.

use std::collections::HashMap;

use actix_multipart::Multipart;
use futures::StreamExt;
use log::debug;

use crate::backend::models::UploadedFile;
use crate::common::errors::SiteError;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Text fields and files of a submitted form
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: Vec<(String, UploadedFile)>,
}

impl MultipartForm {
    /// Drain a multipart stream; empty file inputs are skipped
    pub async fn read(mut payload: Multipart) -> Result<Self, SiteError> {
        let mut form = MultipartForm::default();

        while let Some(item) = payload.next().await {
            let mut field = item.map_err(|e| SiteError::InvalidForm(e.to_string()))?;

            let disposition = field.content_disposition();
            let name = disposition.get_name().unwrap_or_default().to_string();
            let file_name = disposition.get_filename().map(str::to_string);
            let content_type = field
                .content_type()
                .map(|m| m.to_string())
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

            let mut bytes = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk.map_err(|e| SiteError::InvalidForm(e.to_string()))?;
                bytes.extend_from_slice(&chunk);
            }

            match file_name {
                Some(file_name) if !file_name.is_empty() => {
                    if bytes.is_empty() {
                        continue;
                    }
                    debug!("Received file '{}' ({} bytes) in field '{}'", file_name, bytes.len(), name);
                    form.files.push((name, UploadedFile { file_name, content_type, bytes }));
                }
                _ => {
                    form.fields.insert(name, String::from_utf8_lossy(&bytes).into_owned());
                }
            }
        }

        Ok(form)
    }

    #[cfg(test)]
    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_string(), value.to_string());
        self
    }

    #[cfg(test)]
    pub fn with_file(mut self, name: &str, file: UploadedFile) -> Self {
        self.files.push((name.to_string(), file));
        self
    }

    /// Trimmed text of a field; blank counts as missing
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
    }

    /// Trimmed text of a field, empty when missing
    pub fn text_or_empty(&self, name: &str) -> String {
        self.text(name).unwrap_or_default().to_string()
    }

    /// Field parsed as a number, `None` when blank
    pub fn number<T: std::str::FromStr>(&self, name: &str) -> Result<Option<T>, String> {
        match self.text(name) {
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| format!("invalid {}: '{}'", name, raw)),
            None => Ok(None),
        }
    }

    /// Every file sent under one field name
    pub fn take_files(&mut self, name: &str) -> Vec<UploadedFile> {
        let (matching, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|(field, _)| field == name);
        self.files = rest;
        matching.into_iter().map(|(_, file)| file).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(name: &str) -> UploadedFile {
        UploadedFile {
            file_name: name.into(),
            content_type: "image/png".into(),
            bytes: vec![1],
        }
    }

    #[test]
    fn test_text_and_numbers() {
        let form = MultipartForm::default()
            .with_field("price", " 12.5 ")
            .with_field("id", "")
            .with_field("section_id", "two");

        assert_eq!(form.text("price"), Some("12.5"));
        assert_eq!(form.number::<f64>("price"), Ok(Some(12.5)));
        assert_eq!(form.number::<i64>("id"), Ok(None));
        assert!(form.number::<i64>("section_id").is_err());
        assert_eq!(form.text_or_empty("missing"), "");
    }

    #[test]
    fn test_take_files_by_field() {
        let mut form = MultipartForm::default()
            .with_file("files", png("a.png"))
            .with_file("file", png("b.png"))
            .with_file("files", png("c.png"));

        let names: Vec<String> = form.take_files("files").into_iter().map(|f| f.file_name).collect();
        assert_eq!(names, vec!["a.png", "c.png"]);
        assert_eq!(form.take_files("file").len(), 1);
        assert!(form.take_files("files").is_empty());
    }
}
