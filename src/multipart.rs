//! `multipart/form-data` body assembly.

use bytes::Bytes;

/// A part of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultipartPart {
    /// Scalar field.
    Field {
        /// Field name.
        name: String,
        /// Field value.
        value: String,
    },
    /// File field.
    File {
        /// Field name.
        name: String,
        /// File name reported to the server.
        filename: String,
        /// MIME type of the content.
        mime_type: String,
        /// File content.
        data: Bytes,
    },
}

/// Ordered multipart body with a fixed boundary.
///
/// Parts are written in the order they were added. Names and values are not
/// escaped or checked; the boundary must not occur inside any part.
#[derive(Debug, Clone)]
pub struct MultipartForm {
    boundary: String,
    parts: Vec<MultipartPart>,
}

impl MultipartForm {
    /// Creates a form with a random boundary.
    pub fn new() -> Self {
        Self::with_boundary(uuid::Uuid::new_v4().to_string())
    }

    /// Creates a form with the given boundary.
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            parts: Vec::new(),
        }
    }

    /// Returns the boundary token.
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Returns the parts in insertion order.
    pub fn parts(&self) -> &[MultipartPart] {
        &self.parts
    }

    /// Returns the `Content-Type` header value for this form.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Adds a scalar field.
    pub fn add_field(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.parts.push(MultipartPart::Field {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Adds one field per value, all under the same name, in the given order.
    pub fn add_repeated_field<I, V>(&mut self, name: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        for value in values {
            self.add_field(name, value);
        }
        self
    }

    /// Adds a file field.
    pub fn add_file(
        &mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> &mut Self {
        self.parts.push(MultipartPart::File {
            name: name.into(),
            filename: filename.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        });
        self
    }

    /// Writes the body, returning it with the matching `Content-Type` value.
    ///
    /// Pure: calling it again yields identical bytes.
    pub fn finalize(&self) -> (Bytes, String) {
        let mut body = Vec::with_capacity(self.encoded_len());

        for part in &self.parts {
            body.extend_from_slice(b"--");
            body.extend_from_slice(self.boundary.as_bytes());
            body.extend_from_slice(b"\r\n");

            match part {
                MultipartPart::Field { name, value } => {
                    body.extend_from_slice(b"Content-Disposition: form-data; name=\"");
                    body.extend_from_slice(name.as_bytes());
                    body.extend_from_slice(b"\"\r\n\r\n");
                    body.extend_from_slice(value.as_bytes());
                }
                MultipartPart::File {
                    name,
                    filename,
                    mime_type,
                    data,
                } => {
                    body.extend_from_slice(b"Content-Disposition: form-data; name=\"");
                    body.extend_from_slice(name.as_bytes());
                    body.extend_from_slice(b"\"; filename=\"");
                    body.extend_from_slice(filename.as_bytes());
                    body.extend_from_slice(b"\"\r\n");
                    body.extend_from_slice(b"Content-Type: ");
                    body.extend_from_slice(mime_type.as_bytes());
                    body.extend_from_slice(b"\r\n\r\n");
                    body.extend_from_slice(data);
                }
            }
            body.extend_from_slice(b"\r\n");
        }

        // Final boundary
        body.extend_from_slice(b"--");
        body.extend_from_slice(self.boundary.as_bytes());
        body.extend_from_slice(b"--\r\n");

        (Bytes::from(body), self.content_type())
    }

    fn encoded_len(&self) -> usize {
        let framing = self.boundary.len() + 64;
        let parts: usize = self
            .parts
            .iter()
            .map(|part| match part {
                MultipartPart::Field { name, value } => framing + name.len() + value.len(),
                MultipartPart::File {
                    name,
                    filename,
                    mime_type,
                    data,
                } => framing + name.len() + filename.len() + mime_type.len() + data.len() + 32,
            })
            .sum();
        parts + self.boundary.len() + 6
    }
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_form_is_terminal_boundary() {
        let form = MultipartForm::with_boundary("XYZ");
        let (body, content_type) = form.finalize();
        assert_eq!(&body[..], b"--XYZ--\r\n");
        assert_eq!(content_type, "multipart/form-data; boundary=XYZ");
    }

    #[test]
    fn test_exact_bytes() {
        let mut form = MultipartForm::with_boundary("b0undary");
        form.add_field("model", "whisper-1")
            .add_file("file", "audio.m4a", "audio/mp4", Bytes::from_static(b"\x00\x01AUDIO"));

        let (body, _) = form.finalize();
        let expected: &[u8] = b"--b0undary\r\n\
Content-Disposition: form-data; name=\"model\"\r\n\r\n\
whisper-1\r\n\
--b0undary\r\n\
Content-Disposition: form-data; name=\"file\"; filename=\"audio.m4a\"\r\n\
Content-Type: audio/mp4\r\n\r\n\
\x00\x01AUDIO\r\n\
--b0undary--\r\n";
        assert_eq!(&body[..], expected);
    }

    #[test]
    fn test_repeated_field_preserves_order() {
        let mut form = MultipartForm::with_boundary("B");
        form.add_repeated_field("timestamp_granularities[]", ["word", "segment"])
            .add_field("language", "de");

        let (body, _) = form.finalize();
        let text = String::from_utf8(body.to_vec()).unwrap();
        let word = text.find("\r\n\r\nword\r\n").unwrap();
        let segment = text.find("\r\n\r\nsegment\r\n").unwrap();
        let language = text.find("\r\n\r\nde\r\n").unwrap();
        assert!(word < segment && segment < language);
        assert_eq!(text.matches("name=\"timestamp_granularities[]\"").count(), 2);
    }

    #[test]
    fn test_finalize_is_deterministic() {
        let mut form = MultipartForm::new();
        form.add_field("a", "1")
            .add_file("file", "x.bin", "application/octet-stream", vec![1u8, 2, 3]);

        let (first, first_type) = form.finalize();
        let (second, second_type) = form.finalize();
        assert_eq!(first, second);
        assert_eq!(first_type, second_type);
    }

    #[test]
    fn test_call_order_is_output_order() {
        let orders: [&[&str]; 3] = [&["a", "b", "c"], &["c", "a", "b"], &["b", "c", "a"]];
        for order in orders {
            let mut form = MultipartForm::with_boundary("B");
            for name in order {
                form.add_field(*name, "v");
            }
            let (body, _) = form.finalize();
            let text = String::from_utf8(body.to_vec()).unwrap();
            let positions: Vec<usize> = order
                .iter()
                .map(|name| text.find(&format!("name=\"{}\"", name)).unwrap())
                .collect();
            assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_random_boundaries_differ() {
        assert_ne!(MultipartForm::new().boundary(), MultipartForm::new().boundary());
    }
}
