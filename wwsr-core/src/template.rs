//! printf-style output templates.
//!
//! A template is literal text interleaved with `%x` measurement tags and
//! `\x` escapes:
//! - `%h %H %t %T %C %c %W %G %D %d %P %p %R %N`: measurements (see [`Tag`])
//! - `%%`: a literal percent sign
//! - `\n`, `\r`, `\t`: newline, carriage return, tab
//!
//! Unknown tags and escapes produce no output.

use crate::record::SensorRecord;

/// Labelled multi-line report printed when no format is given.
pub const DEFAULT_TEMPLATE: &str = "time:                  %N
in humidity:           %h %%
out humidity:          %H %%
in temperature:        %t C
out temperature:       %T C
out dew temperature:   %C C
windchill temperature: %c C
wind speed:            %W m/s
wind gust:             %G m/s
wind direction:        %D
pressure:              %P hPa
rel. pressure:         %p hPa
rain:                  %R mm
";

/// XML document with every measurement and its unit.
pub const XML_TEMPLATE: &str = "<data>
\t<temp>
\t\t<indoor>\n\t\t\t<data>%t</data>\n\t\t\t<unit>C</unit>\n\t\t</indoor>
\t\t<outdoor>\n\t\t\t<data>%T</data>\n\t\t\t<unit>C</unit>\n\t\t</outdoor>
\t\t<windchill>\n\t\t\t<data>%c</data>\n\t\t\t<unit>C</unit>\n\t\t</windchill>
\t\t<dewpoint>\n\t\t\t<data>%C</data>\n\t\t\t<unit>C</unit>\n\t\t</dewpoint>
\t</temp>
\t<wind>
\t\t<speed>\n\t\t\t<data>%W</data>\n\t\t\t<unit>m/s</unit>\n\t\t</speed>
\t\t<gust>\n\t\t\t<data>%G</data>\n\t\t\t<unit>m/s</unit>\n\t\t</gust>
\t\t<direct>\n\t\t\t<data>%d</data>\n\t\t\t<unit>degrees</unit>\n\t\t</direct>
\t\t<direct_str>\n\t\t\t<data>%D</data>\n\t\t\t<unit>Str</unit>\n\t\t</direct_str>
\t</wind>
\t<pressure>
\t\t<abs>\n\t\t\t<data>%P</data>\n\t\t\t<unit>hPa</unit>\n\t\t</abs>
\t\t<rel>\n\t\t\t<data>%p</data>\n\t\t\t<unit>hPa</unit>\n\t\t</rel>
\t</pressure>
\t<rain>
\t\t<total>\n\t\t\t<data>%R</data>\n\t\t\t<unit>mm</unit>\n\t\t</total>
\t</rain>
\t<humidity>
\t\t<indoor>\n\t\t\t<data>%h</data>\n\t\t\t<unit>%%</unit>\n\t\t</indoor>
\t\t<outdoor>\n\t\t\t<data>%H</data>\n\t\t\t<unit>%%</unit>\n\t\t</outdoor>
\t</humidity>
</data>
";

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// A measurement placeholder in a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    IndoorHumidity,
    OutdoorHumidity,
    IndoorTemperature,
    OutdoorTemperature,
    DewPoint,
    WindChill,
    WindSpeed,
    WindGust,
    WindDirectionName,
    WindDirectionDegrees,
    Pressure,
    RelativePressure,
    Rain,
    Now,
}

impl Tag {
    /// All tags in help-text order.
    pub const ALL: [Tag; 14] = [
        Tag::IndoorHumidity,
        Tag::OutdoorHumidity,
        Tag::IndoorTemperature,
        Tag::OutdoorTemperature,
        Tag::DewPoint,
        Tag::WindChill,
        Tag::WindSpeed,
        Tag::WindGust,
        Tag::WindDirectionName,
        Tag::WindDirectionDegrees,
        Tag::Pressure,
        Tag::RelativePressure,
        Tag::Rain,
        Tag::Now,
    ];

    pub fn from_char(c: char) -> Option<Tag> {
        Tag::ALL.into_iter().find(|t| t.symbol() == c)
    }

    /// The character following `%` in a template.
    pub fn symbol(self) -> char {
        match self {
            Tag::IndoorHumidity => 'h',
            Tag::OutdoorHumidity => 'H',
            Tag::IndoorTemperature => 't',
            Tag::OutdoorTemperature => 'T',
            Tag::DewPoint => 'C',
            Tag::WindChill => 'c',
            Tag::WindSpeed => 'W',
            Tag::WindGust => 'G',
            Tag::WindDirectionName => 'D',
            Tag::WindDirectionDegrees => 'd',
            Tag::Pressure => 'P',
            Tag::RelativePressure => 'p',
            Tag::Rain => 'R',
            Tag::Now => 'N',
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Tag::IndoorHumidity => "inside humidity",
            Tag::OutdoorHumidity => "outside humidity",
            Tag::IndoorTemperature => "inside temperature",
            Tag::OutdoorTemperature => "outside temperature",
            Tag::DewPoint => "outside dew temperature",
            Tag::WindChill => "outside wind chill temperature",
            Tag::WindSpeed => "wind speed",
            Tag::WindGust => "wind gust",
            Tag::WindDirectionName => "wind direction - named",
            Tag::WindDirectionDegrees => "wind direction - degrees",
            Tag::Pressure => "pressure",
            Tag::RelativePressure => "relative pressure",
            Tag::Rain => "rain",
            Tag::Now => "now - date/time string",
        }
    }

    /// Render this tag's value for a record.
    ///
    /// Real values use one decimal place; humidity is an integer percent.
    pub fn render(self, out: &mut String, record: &SensorRecord, altitude: i32, now: &str) {
        let value = match self {
            Tag::IndoorHumidity => record.indoor_humidity().to_string(),
            Tag::OutdoorHumidity => record.outdoor_humidity().to_string(),
            Tag::IndoorTemperature => format!("{:.1}", record.indoor_temperature()),
            Tag::OutdoorTemperature => format!("{:.1}", record.outdoor_temperature()),
            Tag::DewPoint => format!("{:.1}", record.dew_point()),
            Tag::WindChill => format!("{:.1}", record.wind_chill()),
            Tag::WindSpeed => format!("{:.1}", record.wind_speed()),
            Tag::WindGust => format!("{:.1}", record.wind_gust()),
            Tag::WindDirectionName => record.wind_direction_name().to_string(),
            Tag::WindDirectionDegrees => record.wind_direction_degrees().to_string(),
            Tag::Pressure => format!("{:.1}", record.pressure()),
            Tag::RelativePressure => format!("{:.1}", record.relative_pressure(altitude)),
            Tag::Rain => format!("{:.1}", record.rain()),
            Tag::Now => now.to_string(),
        };
        out.push_str(&value);
    }
}

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Field(Tag),
}

/// A parsed output template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(source: &str) -> Template {
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut chars = source.chars();

        while let Some(c) = chars.next() {
            match c {
                '%' => match chars.next() {
                    Some('%') => text.push('%'),
                    Some(symbol) => {
                        if let Some(tag) = Tag::from_char(symbol) {
                            if !text.is_empty() {
                                segments.push(Segment::Text(std::mem::take(&mut text)));
                            }
                            segments.push(Segment::Field(tag));
                        }
                    }
                    None => {}
                },
                '\\' => match chars.next() {
                    Some('n') => text.push('\n'),
                    Some('r') => text.push('\r'),
                    Some('t') => text.push('\t'),
                    _ => {}
                },
                _ => text.push(c),
            }
        }
        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }

        Template { segments }
    }

    /// Tags referenced by this template, in order of appearance.
    pub fn tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.segments.iter().filter_map(|s| match s {
            Segment::Field(tag) => Some(*tag),
            Segment::Text(_) => None,
        })
    }

    /// Expand the template for one record.
    ///
    /// `now` is substituted verbatim for `%N`.
    pub fn render(&self, record: &SensorRecord, altitude: i32, now: &str) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Field(tag) => tag.render(&mut out, record, altitude, now),
            }
        }
        out
    }
}

impl Default for Template {
    fn default() -> Self {
        Template::parse(DEFAULT_TEMPLATE)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
