use feed_engine::{ItemParser, ParsedItem, RecordParseError};
use serde::Deserialize;
use serde_json::Value;

/// Target box photos are laid out in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ImageSize {
    fn default() -> Self {
        Self {
            width: 375,
            height: 375,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub id: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
    /// Height when scaled to the target width, aspect ratio preserved.
    pub display_height: u32,
}

#[derive(Deserialize)]
struct PhotoRecord {
    id: String,
    url: String,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
}

pub struct PhotoParser {
    image_size: ImageSize,
}

impl PhotoParser {
    pub fn new(image_size: ImageSize) -> Self {
        Self { image_size }
    }

    fn display_height(&self, width: u32, height: u32) -> u32 {
        if width == 0 || height == 0 {
            return self.image_size.height;
        }
        let scaled = u64::from(height) * u64::from(self.image_size.width) / u64::from(width);
        u32::try_from(scaled).unwrap_or(u32::MAX)
    }
}

impl ItemParser for PhotoParser {
    type Item = Photo;

    fn parse(&self, record: &Value) -> Result<ParsedItem<Photo>, RecordParseError> {
        let record = PhotoRecord::deserialize(record)
            .map_err(|err| RecordParseError::Invalid(err.to_string()))?;
        let photo = Photo {
            display_height: self.display_height(record.width, record.height),
            id: record.id.clone(),
            url: record.url,
            width: record.width,
            height: record.height,
        };
        Ok(ParsedItem::new(record.id, photo))
    }
}
