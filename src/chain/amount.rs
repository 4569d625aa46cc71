//! Fixed-point on-chain amounts

use alloy_primitives::U256;
use std::fmt;

/// Decimal exponent for ETH and the Agnetic token
pub const ETHER_DECIMALS: u8 = 18;

/// Places shown for every balance
pub const DISPLAY_PLACES: u8 = 4;

/// Raw integer amount with its decimal exponent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount {
    raw: U256,
    decimals: u8,
}

impl Amount {
    pub const fn new(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    /// An 18-decimal amount (wei for ETH, base units for the token)
    pub const fn ether(raw: U256) -> Self {
        Self::new(raw, ETHER_DECIMALS)
    }

    pub const fn zero() -> Self {
        Self::ether(U256::ZERO)
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    /// Render with exactly `places` fractional digits, rounding half up.
    pub fn format_places(&self, places: u8) -> String {
        let (whole, frac) = if places >= self.decimals {
            let unit = pow10(self.decimals);
            let whole = self.raw / unit;
            let frac = (self.raw % unit) * pow10(places - self.decimals);
            (whole, frac)
        } else {
            let scale = pow10(self.decimals - places);
            let mut scaled = self.raw / scale;
            // Compare the remainder instead of adding half a unit so the
            // maximum U256 cannot overflow.
            if self.raw % scale >= scale / U256::from(2u8) {
                scaled += U256::from(1u8);
            }
            let unit = pow10(places);
            (scaled / unit, scaled % unit)
        };

        if places == 0 {
            return whole.to_string();
        }
        format!("{whole}.{frac:0>width$}", frac = frac.to_string(), width = places as usize)
    }

    /// The four-place display form
    pub fn display(&self) -> String {
        self.format_places(DISPLAY_PLACES)
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

fn pow10(exp: u8) -> U256 {
    U256::from(10u8).pow(U256::from(exp))
}
