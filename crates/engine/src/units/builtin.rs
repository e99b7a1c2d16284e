//! Builtin quantity table. Every factor converts one unit into the SI base
//! unit of its quantity, which is always the first unit listed.

use std::f64::consts::PI;

pub(crate) struct UnitDef {
    pub name: &'static str,
    pub symbol: &'static str,
    pub symbol_utf8: Option<&'static str>,
    pub factor: f64,
    pub offset: f64,
}

pub(crate) struct QuantityDef {
    pub name: &'static str,
    pub units: &'static [UnitDef],
}

const fn u(name: &'static str, symbol: &'static str, factor: f64) -> UnitDef {
    UnitDef { name, symbol, symbol_utf8: None, factor, offset: 0.0 }
}

const fn uu(name: &'static str, symbol: &'static str, utf8: &'static str, factor: f64) -> UnitDef {
    UnitDef { name, symbol, symbol_utf8: Some(utf8), factor, offset: 0.0 }
}

const fn temp(name: &'static str, symbol: &'static str, utf8: Option<&'static str>, factor: f64, offset: f64) -> UnitDef {
    UnitDef { name, symbol, symbol_utf8: utf8, factor, offset }
}

const GALLON_US: f64 = 3.785411784e-3;
const CUBIC_FOOT: f64 = 0.028316846592;
const POUND: f64 = 0.45359237;
const STANDARD_GRAVITY: f64 = 9.80665;

pub(crate) static QUANTITIES: &[QuantityDef] = &[
    QuantityDef { name: "None", units: &[] },
    QuantityDef {
        name: "Length",
        units: &[
            u("metre", "m", 1.0),
            u("centimetre", "cm", 1e-2),
            u("millimetre", "mm", 1e-3),
            uu("micrometre", "um", "µm", 1e-6),
            u("nanometre", "nm", 1e-9),
            u("kilometre", "km", 1e3),
            u("inch", "in", 0.0254),
            u("foot", "ft", 0.3048),
            u("yard", "yd", 0.9144),
            u("mile", "mi", 1609.344),
            u("nautical mile", "NM", 1852.0),
            uu("angstrom", "A", "Å", 1e-10),
        ],
    },
    QuantityDef {
        name: "Time",
        units: &[
            u("second", "s", 1.0),
            u("millisecond", "ms", 1e-3),
            uu("microsecond", "us", "µs", 1e-6),
            u("nanosecond", "ns", 1e-9),
            u("minute", "min", 60.0),
            u("hour", "h", 3600.0),
            u("day", "d", 86400.0),
            u("week", "wk", 604800.0),
            u("year", "yr", 31557600.0),
        ],
    },
    QuantityDef {
        name: "Mass",
        units: &[
            u("kilogram", "kg", 1.0),
            u("gram", "g", 1e-3),
            u("milligram", "mg", 1e-6),
            uu("microgram", "ug", "µg", 1e-9),
            u("tonne", "t", 1e3),
            u("pound", "lb", POUND),
            u("ounce", "oz", POUND / 16.0),
            u("stone", "st", POUND * 14.0),
            u("short ton", "ton", POUND * 2000.0),
            u("long ton", "LT", POUND * 2240.0),
        ],
    },
    QuantityDef {
        name: "Electric Current",
        units: &[
            u("ampere", "A", 1.0),
            u("milliampere", "mA", 1e-3),
            uu("microampere", "uA", "µA", 1e-6),
            u("kiloampere", "kA", 1e3),
        ],
    },
    QuantityDef {
        name: "Temperature",
        units: &[
            temp("kelvin", "K", None, 1.0, 0.0),
            temp("degree Celsius", "degC", Some("°C"), 1.0, 273.15),
            temp("degree Fahrenheit", "degF", Some("°F"), 5.0 / 9.0, 459.67),
            temp("degree Rankine", "degR", Some("°R"), 5.0 / 9.0, 0.0),
        ],
    },
    QuantityDef {
        name: "Amount of Substance",
        units: &[
            u("mole", "mol", 1.0),
            u("millimole", "mmol", 1e-3),
            uu("micromole", "umol", "µmol", 1e-6),
            u("kilomole", "kmol", 1e3),
        ],
    },
    QuantityDef {
        name: "Luminous Intensity",
        units: &[
            u("candela", "cd", 1.0),
            u("millicandela", "mcd", 1e-3),
            u("kilocandela", "kcd", 1e3),
        ],
    },
    QuantityDef {
        name: "Area",
        units: &[
            uu("square metre", "m2", "m²", 1.0),
            uu("square centimetre", "cm2", "cm²", 1e-4),
            uu("square millimetre", "mm2", "mm²", 1e-6),
            uu("square kilometre", "km2", "km²", 1e6),
            u("hectare", "ha", 1e4),
            u("are", "a", 1e2),
            u("acre", "ac", 4046.8564224),
            uu("square inch", "in2", "in²", 6.4516e-4),
            uu("square foot", "ft2", "ft²", 0.09290304),
            uu("square yard", "yd2", "yd²", 0.83612736),
            uu("square mile", "mi2", "mi²", 2589988.110336),
        ],
    },
    QuantityDef {
        name: "Volume",
        units: &[
            uu("cubic metre", "m3", "m³", 1.0),
            u("litre", "L", 1e-3),
            u("millilitre", "mL", 1e-6),
            uu("cubic centimetre", "cm3", "cm³", 1e-6),
            uu("cubic millimetre", "mm3", "mm³", 1e-9),
            uu("cubic inch", "in3", "in³", 1.6387064e-5),
            uu("cubic foot", "ft3", "ft³", CUBIC_FOOT),
            u("US gallon", "gal", GALLON_US),
            u("imperial gallon", "gal(UK)", 4.54609e-3),
            u("US fluid ounce", "floz", GALLON_US / 128.0),
            u("barrel", "bbl", GALLON_US * 42.0),
        ],
    },
    QuantityDef {
        name: "Speed",
        units: &[
            u("metre per second", "m/s", 1.0),
            u("kilometre per hour", "km/h", 1.0 / 3.6),
            u("mile per hour", "mph", 0.44704),
            u("knot", "kn", 1852.0 / 3600.0),
            u("foot per second", "ft/s", 0.3048),
            u("centimetre per second", "cm/s", 1e-2),
        ],
    },
    QuantityDef {
        name: "Angular Speed",
        units: &[
            u("radian per second", "rad/s", 1.0),
            u("revolution per minute", "rpm", 2.0 * PI / 60.0),
            u("revolution per second", "rps", 2.0 * PI),
            uu("degree per second", "deg/s", "°/s", PI / 180.0),
        ],
    },
    QuantityDef {
        name: "Acceleration",
        units: &[
            uu("metre per second squared", "m/s2", "m/s²", 1.0),
            u("standard gravity", "g0", STANDARD_GRAVITY),
            uu("foot per second squared", "ft/s2", "ft/s²", 0.3048),
            u("gal", "Gal", 1e-2),
        ],
    },
    QuantityDef {
        name: "Pressure",
        units: &[
            u("pascal", "Pa", 1.0),
            u("hectopascal", "hPa", 1e2),
            u("kilopascal", "kPa", 1e3),
            u("megapascal", "MPa", 1e6),
            u("bar", "bar", 1e5),
            u("millibar", "mbar", 1e2),
            u("atmosphere", "atm", 101325.0),
            u("torr", "Torr", 101325.0 / 760.0),
            u("millimetre of mercury", "mmHg", 133.322387415),
            u("pound per square inch", "psi", 6894.757293168361),
            u("kilogram-force per square centimetre", "kgf/cm2", STANDARD_GRAVITY * 1e4),
        ],
    },
    QuantityDef {
        name: "Mass Flow",
        units: &[
            u("kilogram per second", "kg/s", 1.0),
            u("kilogram per hour", "kg/h", 1.0 / 3600.0),
            u("gram per second", "g/s", 1e-3),
            u("tonne per hour", "t/h", 1e3 / 3600.0),
            u("pound per second", "lb/s", POUND),
            u("pound per hour", "lb/h", POUND / 3600.0),
        ],
    },
    QuantityDef {
        name: "Volumetric Flow",
        units: &[
            uu("cubic metre per second", "m3/s", "m³/s", 1.0),
            uu("cubic metre per hour", "m3/h", "m³/h", 1.0 / 3600.0),
            u("litre per second", "L/s", 1e-3),
            u("litre per minute", "L/min", 1e-3 / 60.0),
            u("US gallon per minute", "gpm", GALLON_US / 60.0),
            uu("cubic foot per minute", "cfm", "ft³/min", CUBIC_FOOT / 60.0),
        ],
    },
    QuantityDef {
        name: "Force",
        units: &[
            u("newton", "N", 1.0),
            u("kilonewton", "kN", 1e3),
            u("dyne", "dyn", 1e-5),
            u("kilogram-force", "kgf", STANDARD_GRAVITY),
            u("pound-force", "lbf", POUND * STANDARD_GRAVITY),
        ],
    },
    QuantityDef {
        name: "Energy",
        units: &[
            u("joule", "J", 1.0),
            u("kilojoule", "kJ", 1e3),
            u("megajoule", "MJ", 1e6),
            u("calorie", "cal", 4.184),
            u("kilocalorie", "kcal", 4184.0),
            u("watt hour", "Wh", 3600.0),
            u("kilowatt hour", "kWh", 3.6e6),
            u("electronvolt", "eV", 1.602176634e-19),
            u("British thermal unit", "BTU", 1055.05585262),
            u("erg", "erg", 1e-7),
        ],
    },
    QuantityDef {
        name: "Power",
        units: &[
            u("watt", "W", 1.0),
            u("milliwatt", "mW", 1e-3),
            u("kilowatt", "kW", 1e3),
            u("megawatt", "MW", 1e6),
            u("horsepower", "hp", 745.69987158227022),
            u("metric horsepower", "PS", 735.49875),
            u("BTU per hour", "BTU/h", 1055.05585262 / 3600.0),
        ],
    },
    QuantityDef {
        name: "Angle",
        units: &[
            u("radian", "rad", 1.0),
            uu("degree", "deg", "°", PI / 180.0),
            u("gradian", "grad", PI / 200.0),
            uu("arcminute", "arcmin", "′", PI / 10800.0),
            uu("arcsecond", "arcsec", "″", PI / 648000.0),
            u("revolution", "rev", 2.0 * PI),
        ],
    },
    QuantityDef {
        name: "Density",
        units: &[
            uu("kilogram per cubic metre", "kg/m3", "kg/m³", 1.0),
            uu("gram per cubic centimetre", "g/cm3", "g/cm³", 1e3),
            u("gram per litre", "g/L", 1.0),
            uu("pound per cubic foot", "lb/ft3", "lb/ft³", POUND / CUBIC_FOOT),
            u("pound per US gallon", "lb/gal", POUND / GALLON_US),
        ],
    },
    QuantityDef {
        name: "Dynamic Viscosity",
        units: &[
            uu("pascal second", "Pa.s", "Pa·s", 1.0),
            uu("millipascal second", "mPa.s", "mPa·s", 1e-3),
            u("poise", "P", 0.1),
            u("centipoise", "cP", 1e-3),
        ],
    },
    QuantityDef {
        name: "Kinematic Viscosity",
        units: &[
            uu("square metre per second", "m2/s", "m²/s", 1.0),
            uu("square millimetre per second", "mm2/s", "mm²/s", 1e-6),
            u("stokes", "St", 1e-4),
            u("centistokes", "cSt", 1e-6),
        ],
    },
    QuantityDef {
        name: "Illuminance",
        units: &[
            u("lux", "lx", 1.0),
            u("foot-candle", "fc", 10.763910416709722),
            u("phot", "ph", 1e4),
        ],
    },
    QuantityDef {
        name: "Electric Charge",
        units: &[
            u("coulomb", "C", 1.0),
            u("millicoulomb", "mC", 1e-3),
            uu("microcoulomb", "uC", "µC", 1e-6),
            u("ampere hour", "Ah", 3600.0),
            u("milliampere hour", "mAh", 3.6),
        ],
    },
    QuantityDef {
        name: "Electric Potential",
        units: &[
            u("volt", "V", 1.0),
            u("millivolt", "mV", 1e-3),
            uu("microvolt", "uV", "µV", 1e-6),
            u("kilovolt", "kV", 1e3),
        ],
    },
    QuantityDef {
        name: "Frequency",
        units: &[
            u("hertz", "Hz", 1.0),
            u("kilohertz", "kHz", 1e3),
            u("megahertz", "MHz", 1e6),
            u("gigahertz", "GHz", 1e9),
        ],
    },
    QuantityDef {
        name: "Data Size",
        units: &[
            u("byte", "B", 1.0),
            u("bit", "b", 0.125),
            u("kilobyte", "kB", 1e3),
            u("megabyte", "MB", 1e6),
            u("gigabyte", "GB", 1e9),
            u("kibibyte", "KiB", 1024.0),
            u("mebibyte", "MiB", 1048576.0),
            u("gibibyte", "GiB", 1073741824.0),
        ],
    },
];
