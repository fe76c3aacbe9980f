//! Turning arbitrary bytes into something a remote surface can display.
//!
//! Remote engines only accept addressable URIs, so local content is packaged
//! into `data:` URIs. Each content kind has its own framing: HTML goes in as
//! is, images need their mime subtype in the URI, media gets wrapped in a
//! small HTML player document first. The compositor does not care which
//! loader fed the surface.

use crate::errors::CanvasError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use url::Url;

/// Packages raw bytes into a URI the remote surface can navigate to.
pub trait ContentLoader {
    /// Builds the `data:` URI. `mime_hint` is the mime subtype where the
    /// loader needs one ("png", "mp4", ...); loaders that do not need a hint
    /// ignore it.
    fn encode_as_displayable_uri(
        &self,
        bytes: &[u8],
        mime_hint: Option<&str>,
    ) -> Result<Url, CanvasError>;

    /// Derives the mime hint from a filename, for loaders that can. Returns
    /// `Ok(None)` when the loader needs no hint, an invalid-request error when
    /// a hint is needed but the extension is not recognised.
    fn guess_mime_hint(&self, filename: &str) -> Result<Option<String>, CanvasError>;
}

fn parse_data_uri(uri: String) -> Result<Url, CanvasError> {
    Url::parse(&uri).map_err(|e| CanvasError::Content(format!("malformed data URI: {e}")))
}

fn extension_of(filename: &str) -> String {
    filename
        .rsplit('.')
        .next()
        .unwrap_or("")
        .to_ascii_lowercase()
}

/// HTML markup, displayed directly.
pub struct HtmlContent;

impl ContentLoader for HtmlContent {
    fn encode_as_displayable_uri(
        &self,
        bytes: &[u8],
        _mime_hint: Option<&str>,
    ) -> Result<Url, CanvasError> {
        parse_data_uri(format!(
            "data:text/html;charset=utf8;base64,{}",
            STANDARD.encode(bytes)
        ))
    }

    fn guess_mime_hint(&self, _filename: &str) -> Result<Option<String>, CanvasError> {
        Ok(None)
    }
}

/// A single image, displayed by the engine's built-in image viewer.
pub struct ImageContent;

impl ContentLoader for ImageContent {
    fn encode_as_displayable_uri(
        &self,
        bytes: &[u8],
        mime_hint: Option<&str>,
    ) -> Result<Url, CanvasError> {
        let subtype = mime_hint.ok_or_else(|| {
            CanvasError::InvalidRequest(
                "image content needs a mime subtype, none was supplied".to_string(),
            )
        })?;

        parse_data_uri(format!(
            "data:image/{subtype};base64,{}",
            STANDARD.encode(bytes)
        ))
    }

    fn guess_mime_hint(&self, filename: &str) -> Result<Option<String>, CanvasError> {
        let subtype = match extension_of(filename).as_str() {
            "svg" => "svg+xml",
            "jpg" | "jpeg" => "jpeg",
            "png" => "png",
            "gif" => "gif",
            _ => {
                return Err(CanvasError::InvalidRequest(format!(
                    "can't guess the mime type from the extension of '{filename}', \
                     supply it explicitly"
                )))
            }
        };
        Ok(Some(subtype.to_string()))
    }
}

/// Video/audio media, wrapped in a minimal HTML player document.
pub struct MediaContent;

impl ContentLoader for MediaContent {
    fn encode_as_displayable_uri(
        &self,
        bytes: &[u8],
        mime_hint: Option<&str>,
    ) -> Result<Url, CanvasError> {
        let subtype = mime_hint.ok_or_else(|| {
            CanvasError::InvalidRequest(
                "media content needs a mime subtype, none was supplied".to_string(),
            )
        })?;

        let media_uri = format!("data:video/{subtype};base64,{}", STANDARD.encode(bytes));
        let wrapper =
            format!("<video autoplay controls src=\"{media_uri}\"></video>\n");

        // the wrapper document is what actually gets displayed
        HtmlContent.encode_as_displayable_uri(wrapper.as_bytes(), None)
    }

    fn guess_mime_hint(&self, filename: &str) -> Result<Option<String>, CanvasError> {
        let subtype = match extension_of(filename).as_str() {
            "mp4" | "m4v" => "mp4",
            "webm" => "webm",
            "ogg" | "ogv" => "ogg",
            _ => {
                return Err(CanvasError::InvalidRequest(format!(
                    "can't guess the mime type from the extension of '{filename}', \
                     supply it explicitly"
                )))
            }
        };
        Ok(Some(subtype.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_encodes_without_a_hint() {
        let uri = HtmlContent
            .encode_as_displayable_uri(b"<h1>hi</h1>", None)
            .unwrap();
        let s = uri.as_str();
        assert!(s.starts_with("data:text/html;charset=utf8;base64,"));

        let payload = s.rsplit(',').next().unwrap();
        assert_eq!(STANDARD.decode(payload).unwrap(), b"<h1>hi</h1>");
    }

    #[test]
    fn image_requires_a_subtype() {
        let err = ImageContent
            .encode_as_displayable_uri(&[1, 2, 3], None)
            .unwrap_err();
        assert!(matches!(err, CanvasError::InvalidRequest(_)));

        let uri = ImageContent
            .encode_as_displayable_uri(&[1, 2, 3], Some("png"))
            .unwrap();
        assert!(uri.as_str().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn image_subtype_guessing() {
        let loader = ImageContent;
        assert_eq!(
            loader.guess_mime_hint("photo.JPEG").unwrap().as_deref(),
            Some("jpeg")
        );
        assert_eq!(
            loader.guess_mime_hint("icon.svg").unwrap().as_deref(),
            Some("svg+xml")
        );
        assert!(matches!(
            loader.guess_mime_hint("archive.tar.gz"),
            Err(CanvasError::InvalidRequest(_))
        ));
    }

    #[test]
    fn media_wraps_in_a_player_document() {
        let uri = MediaContent
            .encode_as_displayable_uri(&[0xDE, 0xAD], Some("mp4"))
            .unwrap();
        let s = uri.as_str();
        assert!(s.starts_with("data:text/html;charset=utf8;base64,"));

        let html = STANDARD.decode(s.rsplit(',').next().unwrap()).unwrap();
        let html = String::from_utf8(html).unwrap();
        assert!(html.contains("<video"));
        assert!(html.contains("data:video/mp4;base64,"));
    }

    #[test]
    fn media_subtype_guessing() {
        let loader = MediaContent;
        assert_eq!(
            loader.guess_mime_hint("clip.webm").unwrap().as_deref(),
            Some("webm")
        );
        assert!(matches!(
            loader.guess_mime_hint("clip.wmv"),
            Err(CanvasError::InvalidRequest(_))
        ));
    }
}
