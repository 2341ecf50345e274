use rand::Rng;

use crate::{config::IdentityConfig, core::Imei};

/// Device identity provider.
///
/// Holds the ordered pool of configured identifiers and hands them out in
/// round-robin order. The cursor starts at the first entry and is advanced
/// before every read, so a pool of `[A, B, C]` yields `B, C, A, B, ...`.
///
/// When the pool is empty and synthesis is allowed, every call yields a
/// freshly generated identifier.
#[derive(Clone, Debug)]
pub struct IdentityProvider {
    /// Validated identifiers in configuration order.
    pool: Vec<Imei>,
    /// Round-robin cursor.
    cursor: usize,
    /// Identifier reported at startup.
    initial: Imei,
}

impl IdentityProvider {
    /// Resolve the identity pool from configuration.
    pub fn from_config<R: Rng + ?Sized>(config: &IdentityConfig, rng: &mut R) -> crate::Result<Self> {
        Self::new(
            config.device_imei.as_deref(),
            config.device_imei_list.as_deref(),
            config.allow_generate_imei,
            rng,
        )
    }

    /// Resolve the identity pool from candidate identifiers.
    ///
    /// The single identifier must be valid when given. Invalid entries in the
    /// list are dropped with a warning. If no identifier remains and synthesis
    /// is not allowed, this is a configuration error.
    pub fn new<R: Rng + ?Sized>(
        single: Option<&str>,
        list: Option<&str>,
        allow_generate: bool,
        rng: &mut R,
    ) -> crate::Result<Self> {
        let mut pool = Vec::new();

        if let Some(single) = single.map(str::trim).filter(|s| !s.is_empty()) {
            let imei = single
                .parse::<Imei>()
                .map_err(|e| crate::Error::Configuration(e.to_string()))?;
            pool.push(imei);
        }

        if let Some(list) = list {
            pool.extend(parse_list(list));
        }

        let initial = match pool.first() {
            Some(imei) => {
                log::info!("Identifier configured: {}", imei);
                if pool.len() > 1 {
                    log::info!("Identifier pool holds {} devices", pool.len());
                }
                imei.clone()
            }
            None if allow_generate => {
                let imei = Imei::generate(rng);
                log::warn!("No identifier configured, generating random identifier: {}", imei);
                imei
            }
            None => {
                return Err(crate::Error::Configuration(
                    "no device identifier configured and identifier generation is disabled"
                        .to_owned(),
                ));
            }
        };

        Ok(Self {
            pool,
            cursor: 0,
            initial,
        })
    }

    /// Configured identifiers.
    #[inline]
    pub fn pool(&self) -> &[Imei] {
        &self.pool
    }

    /// Identifier reported at startup.
    #[inline]
    pub fn initial(&self) -> &Imei {
        &self.initial
    }

    /// Retrieve the current identifier and advance the cursor.
    pub fn next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Imei {
        match self.pool.len() {
            0 => Imei::generate(rng),
            1 => self.pool[0].clone(),
            len => {
                self.cursor = (self.cursor + 1) % len;
                self.pool[self.cursor].clone()
            }
        }
    }
}

/// Parse a comma separated identifier list.
///
/// Empty entries are skipped, invalid entries are dropped with a warning.
pub fn parse_list(list: &str) -> Vec<Imei> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| match entry.parse::<Imei>() {
            Ok(imei) => Some(imei),
            Err(e) => {
                log::warn!("Dropping invalid identifier: {}", e);
                None
            }
        })
        .collect()
}
