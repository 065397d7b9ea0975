//! Single GET over libcurl, streaming the body into a `.part` file.

use crate::error::FetchError;
use crate::storage::PartFile;
use std::io;
use std::time::Duration;

/// What the server answered, once the transfer finished.
#[derive(Debug)]
pub(super) struct Response {
    pub code: u32,
    /// Final URL after redirects, when libcurl reports one.
    pub effective_url: Option<String>,
}

/// Requests `url` and streams the body into `part`.
///
/// Any status is returned as a `Response`; only transport and local write
/// failures are errors. The connect phase and each stalled read are bounded by `timeout`.
pub(super) fn get(
    url: &str,
    user_agent: &str,
    timeout: Duration,
    part: &mut PartFile,
) -> Result<Response, FetchError> {
    let mut write_err: Option<io::Error> = None;
    let result = perform(url, user_agent, timeout, part, &mut write_err);
    if let Some(source) = write_err {
        return Err(FetchError::Storage {
            path: part.temp_path().to_path_buf(),
            source,
        });
    }
    result.map_err(|source| FetchError::Transport {
        url: url.to_string(),
        source,
    })
}

fn perform(
    url: &str,
    user_agent: &str,
    timeout: Duration,
    part: &mut PartFile,
    write_err: &mut Option<io::Error>,
) -> Result<Response, curl::Error> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.useragent(user_agent)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(timeout)?;
    easy.low_speed_limit(1)?;
    easy.low_speed_time(timeout)?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match part.write_chunk(data) {
            Ok(()) => Ok(data.len()),
            Err(e) => {
                *write_err = Some(e);
                Ok(0) // abort transfer
            }
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    let effective_url = easy.effective_url()?.map(str::to_string);
    Ok(Response {
        code,
        effective_url,
    })
}

/// The final URL, when redirects moved away from `requested`.
pub(super) fn redirected(requested: &str, effective: Option<&str>) -> Option<String> {
    effective
        .filter(|e| !e.is_empty() && *e != requested)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirected_only_when_different() {
        let u = "https://a.example.com/x.gif";
        assert_eq!(redirected(u, None), None);
        assert_eq!(redirected(u, Some(u)), None);
        assert_eq!(redirected(u, Some("")), None);
        assert_eq!(
            redirected(u, Some("https://b.example.com/x.gif")).as_deref(),
            Some("https://b.example.com/x.gif")
        );
    }
}
