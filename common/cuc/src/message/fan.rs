// Licensed under the Apache-2.0 license

use crate::codec::CucCodecError;
use zerocopy::{FromBytes, Immutable, IntoBytes, LE, U32};

/// SET_FAN_PWM value that hands the fan back to automatic control.
pub const FAN_PWM_AUTO: u8 = 255;
pub const FAN_PWM_MAX_PERCENT: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, FromBytes, IntoBytes, Immutable)]
#[repr(C, packed)]
pub struct SetFanPwmRequest {
    /// Duty cycle 0..=100 for manual control, or `FAN_PWM_AUTO`.
    pub percent: u8,
}

impl SetFanPwmRequest {
    pub fn manual(percent: u8) -> Result<Self, CucCodecError> {
        if percent > FAN_PWM_MAX_PERCENT {
            return Err(CucCodecError::InvalidArgument);
        }
        Ok(SetFanPwmRequest { percent })
    }

    pub fn auto() -> Self {
        SetFanPwmRequest {
            percent: FAN_PWM_AUTO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, FromBytes, IntoBytes, Immutable)]
#[repr(C, packed)]
pub struct GetFanRpmResponse {
    pub rpm: U32<LE>,
    pub percent: u8,
    pub is_auto: u8,
}

impl GetFanRpmResponse {
    pub fn rpm(&self) -> u32 {
        self.rpm.get()
    }

    pub fn is_auto(&self) -> bool {
        self.is_auto != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CucCodec;

    #[test]
    fn test_set_fan_pwm_range() {
        assert_eq!(SetFanPwmRequest::manual(100).unwrap().percent, 100);
        assert_eq!(
            SetFanPwmRequest::manual(101),
            Err(CucCodecError::InvalidArgument)
        );
        assert_eq!(SetFanPwmRequest::auto().percent, 255);
    }

    #[test]
    fn test_fan_rpm_response() {
        let rsp = GetFanRpmResponse::decode(&[0xB8, 0x0B, 0x00, 0x00, 40, 1]).unwrap();
        assert_eq!(rsp.rpm(), 3000);
        assert_eq!(rsp.percent, 40);
        assert!(rsp.is_auto());
    }
}
