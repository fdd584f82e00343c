use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use crate::actions::file_command::EOL;
use crate::actions::STEP_SUMMARY_VAR;
use crate::error::{AppResult, ChannelError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableCell {
    Text(String),
    Data {
        data: String,
        header: bool,
        colspan: Option<u32>,
        rowspan: Option<u32>,
    },
}

impl TableCell {
    pub fn text(data: impl Into<String>) -> Self {
        TableCell::Text(data.into())
    }

    pub fn header(data: impl Into<String>) -> Self {
        TableCell::Data {
            data: data.into(),
            header: true,
            colspan: None,
            rowspan: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImageOptions {
    pub width: Option<String>,
    pub height: Option<String>,
}

/// Buffered HTML fragment destined for the job's step summary file.
#[derive(Debug, Default)]
pub struct Summary {
    buffer: String,
    channel: Option<PathBuf>,
    resolved: Option<PathBuf>,
}

impl Summary {
    pub fn new(channel: Option<PathBuf>) -> Self {
        Self {
            buffer: String::new(),
            channel,
            resolved: None,
        }
    }

    /// Resolves the summary file, checking once that it can be opened for append.
    pub fn file_path(&mut self) -> AppResult<PathBuf> {
        if let Some(path) = &self.resolved {
            return Ok(path.clone());
        }

        let path = self
            .channel
            .clone()
            .ok_or_else(|| ChannelError::Missing(STEP_SUMMARY_VAR.to_string()))?;

        OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&path)
            .map_err(|source| ChannelError::Permission {
                path: path.clone(),
                source,
            })?;

        self.resolved = Some(path.clone());
        Ok(path)
    }

    /// Appends the buffer to the summary file and empties it.
    pub fn write(&mut self) -> AppResult<()> {
        self.flush(false)
    }

    /// Replaces the summary file contents with the buffer and empties it.
    pub fn overwrite(&mut self) -> AppResult<()> {
        self.flush(true)
    }

    pub fn clear(&mut self) -> AppResult<()> {
        self.empty_buffer();
        self.overwrite()
    }

    fn flush(&mut self, overwrite: bool) -> AppResult<()> {
        let path = self.file_path()?;
        let mut file = if overwrite {
            OpenOptions::new().write(true).truncate(true).open(&path)?
        } else {
            OpenOptions::new().append(true).open(&path)?
        };
        file.write_all(self.buffer.as_bytes())?;
        self.empty_buffer();
        Ok(())
    }

    pub fn stringify(&self) -> &str {
        &self.buffer
    }

    pub fn is_empty_buffer(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn empty_buffer(&mut self) -> &mut Self {
        self.buffer.clear();
        self
    }

    pub fn add_raw(&mut self, text: &str, add_eol: bool) -> &mut Self {
        self.buffer.push_str(text);
        if add_eol { self.add_eol() } else { self }
    }

    pub fn add_eol(&mut self) -> &mut Self {
        self.add_raw(EOL, false)
    }

    pub fn add_code_block(&mut self, code: &str, lang: Option<&str>) -> &mut Self {
        let attrs: Vec<(&str, &str)> = lang.map(|lang| ("lang", lang)).into_iter().collect();
        let element = wrap("pre", Some(&wrap("code", Some(code), &[])), &attrs);
        self.add_raw(&element, true)
    }

    pub fn add_list<S: AsRef<str>>(&mut self, items: &[S], ordered: bool) -> &mut Self {
        let tag = if ordered { "ol" } else { "ul" };
        let list_items: String = items
            .iter()
            .map(|item| wrap("li", Some(item.as_ref()), &[]))
            .collect();
        self.add_raw(&wrap(tag, Some(&list_items), &[]), true)
    }

    pub fn add_table(&mut self, rows: &[Vec<TableCell>]) -> &mut Self {
        let mut body = String::new();
        for row in rows {
            let cells: String = row.iter().map(render_cell).collect();
            body.push_str(&wrap("tr", Some(&cells), &[]));
        }
        self.add_raw(&wrap("table", Some(&body), &[]), true)
    }

    pub fn add_details(&mut self, label: &str, content: &str) -> &mut Self {
        let inner = format!("{}{content}", wrap("summary", Some(label), &[]));
        self.add_raw(&wrap("details", Some(&inner), &[]), true)
    }

    pub fn add_image(&mut self, src: &str, alt: &str, options: &ImageOptions) -> &mut Self {
        let mut attrs = vec![("src", src), ("alt", alt)];
        if let Some(width) = &options.width {
            attrs.push(("width", width.as_str()));
        }
        if let Some(height) = &options.height {
            attrs.push(("height", height.as_str()));
        }
        self.add_raw(&wrap("img", None, &attrs), true)
    }

    /// Levels outside 1..=6 fall back to `h1`.
    pub fn add_heading(&mut self, text: &str, level: u8) -> &mut Self {
        let level = if (1..=6).contains(&level) { level } else { 1 };
        self.add_raw(&wrap(&format!("h{level}"), Some(text), &[]), true)
    }

    pub fn add_separator(&mut self) -> &mut Self {
        self.add_raw(&wrap("hr", None, &[]), true)
    }

    pub fn add_break(&mut self) -> &mut Self {
        self.add_raw(&wrap("br", None, &[]), true)
    }

    pub fn add_quote(&mut self, text: &str, cite: Option<&str>) -> &mut Self {
        let attrs: Vec<(&str, &str)> = cite.map(|cite| ("cite", cite)).into_iter().collect();
        self.add_raw(&wrap("blockquote", Some(text), &attrs), true)
    }

    pub fn add_link(&mut self, text: &str, href: &str) -> &mut Self {
        self.add_raw(&wrap("a", Some(text), &[("href", href)]), true)
    }
}

fn render_cell(cell: &TableCell) -> String {
    match cell {
        TableCell::Text(data) => wrap("td", Some(data), &[]),
        TableCell::Data {
            data,
            header,
            colspan,
            rowspan,
        } => {
            let tag = if *header { "th" } else { "td" };
            let colspan = colspan.map(|span| span.to_string());
            let rowspan = rowspan.map(|span| span.to_string());
            let mut attrs = Vec::new();
            if let Some(span) = &colspan {
                attrs.push(("colspan", span.as_str()));
            }
            if let Some(span) = &rowspan {
                attrs.push(("rowspan", span.as_str()));
            }
            wrap(tag, Some(data), &attrs)
        }
    }
}

fn wrap(tag: &str, content: Option<&str>, attrs: &[(&str, &str)]) -> String {
    let attrs: String = attrs
        .iter()
        .map(|(key, value)| format!(" {key}=\"{value}\""))
        .collect();

    match content {
        Some(content) => format!("<{tag}{attrs}>{content}</{tag}>"),
        None => format!("<{tag}{attrs}>"),
    }
}
