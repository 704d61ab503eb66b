/// Power flow as reported by a two channel energy meter, normalised to kilowatts.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyReading {
    pub grid_kw: f64,
    pub solar_kw: f64,
    /// Net household figure, `grid_kw + solar_kw`. Negative while exporting.
    pub home_kw: f64,
    pub time: String,
}

impl EnergyReading {
    pub fn new(grid_kw: f64, solar_kw: f64, time: String) -> EnergyReading {
        EnergyReading {
            grid_kw,
            solar_kw,
            home_kw: grid_kw + solar_kw,
            time,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InverterReading {
    pub power_kw: f64,
    pub yield_today_kwh: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReading {
    pub description: String,
    pub temperature: String,
}

impl WeatherReading {
    /// Temperature as shown on the panel, e.g. `+21°C` becomes `21°C`.
    pub fn display_temperature(&self) -> &str {
        self.temperature.trim().trim_start_matches('+').trim()
    }
}
