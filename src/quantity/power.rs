quantity!(Kilowatts, "kW");

impl Kilowatts {
    pub fn is_producing(self) -> bool {
        self > Self::ZERO
    }
}
