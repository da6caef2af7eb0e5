/// Connection link properties announced by the client.
///
/// Each field is replaced wholesale when a new value arrives and released
/// with the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Link {
    pub app: Option<String>,
    pub flash_ver: Option<String>,
    pub swf_url: Option<String>,
    pub tc_url: Option<String>,
    pub page_url: Option<String>,
    pub playpath: Option<String>,
    pub auth: Option<String>,
}

/// Per-connection state, owned by the task serving the connection.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub link: Link,
    pub object_encoding: f64,
    pub audio_codecs: f64,
    pub video_codecs: f64,
    /// Requested start offset in milliseconds
    pub seek_time: f64,
    /// Requested play length, when the client sent one
    pub length: Option<f64>,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        Session {
            id: id.into(),
            link: Link::default(),
            object_encoding: 0.0,
            audio_codecs: 0.0,
            video_codecs: 0.0,
            seek_time: 0.0,
            length: None,
        }
    }
}
