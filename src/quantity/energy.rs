use std::ops::Div;

quantity!(KilowattHours, "kWh");

impl Div for KilowattHours {
    type Output = f64;

    fn div(self, rhs: Self) -> Self::Output {
        self.0 / rhs.0
    }
}
