use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("response is not valid JSON: {0}")]
    Json(String),
    #[error("no sensor in response (check the station id)")]
    NoSensor,
}

impl From<ureq::Error> for ClientError {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::Status(status, resp) => Self::Status {
                status,
                url: resp.get_url().to_string(),
            },
            ureq::Error::Transport(t) => Self::Transport(t.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
