// Fixed-delay retry logic for blocking calls.
//
// Runs `$block` up to `$attempts` times, sleeping `$delay` between attempts, and
// yields the first `Ok` or the last error. There is no sleep after the final attempt.
#[macro_export]
macro_rules! call_with_retries {
    ($block:block, $attempts:expr, $delay:expr) => {{
        let attempts: u32 = $attempts;
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match $block {
                Ok(result) => break Ok(result),
                Err(e) => {
                    if attempt >= attempts {
                        break Err(::anyhow::anyhow!("{e:#}"));
                    }
                    std::thread::sleep($delay);
                }
            }
        }
    }};
}
