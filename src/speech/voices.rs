//! Voice pool handling: the rotation allocator and the `--voices` parser.

use crate::speech::Voice;

/// Pick the voice for a queue position.
///
/// Round-robin over the allowlist-restricted pool when rotation is on; the
/// first pool voice otherwise. An empty pool yields `None` and the engine
/// default applies. An allowlist that matches nothing falls back to the
/// whole pool rather than silencing playback.
pub fn voice_for(
    index: usize,
    pool: &[Voice],
    allowlist: &[String],
    rotate: bool,
) -> Option<String> {
    if pool.is_empty() {
        return None;
    }
    if !rotate {
        return Some(pool[0].id.clone());
    }

    let restricted: Vec<&Voice> = if allowlist.is_empty() {
        pool.iter().collect()
    } else {
        let matched: Vec<&Voice> = pool.iter().filter(|v| allowlist.contains(&v.id)).collect();
        if matched.is_empty() {
            pool.iter().collect()
        } else {
            matched
        }
    };

    Some(restricted[index % restricted.len()].id.clone())
}

/// Parse `espeak --voices` style output into a voice pool.
///
/// Expected columns: `Pty Language Age/Gender VoiceName File Other`.
/// Header and malformed lines are skipped.
pub fn parse_voice_listing(output: &str) -> Vec<Voice> {
    let mut voices = Vec::new();

    for line in output.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 {
            continue;
        }
        if fields[0].parse::<u32>().is_err() {
            continue;
        }

        voices.push(Voice {
            id: fields[3].to_string(),
            locale: fields[1].to_string(),
        });
    }

    voices
}
