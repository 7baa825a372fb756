// Every control change refetches /api/map and rebuilds both layers.

pub const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>John Snow's Cholera Map</title>
  <link href="https://unpkg.com/maplibre-gl@3.6.2/dist/maplibre-gl.css" rel="stylesheet" />
  <script src="https://unpkg.com/maplibre-gl@3.6.2/dist/maplibre-gl.js"></script>
  <script src="https://unpkg.com/deck.gl@8.9.35/dist.min.js"></script>
  <style>
    body { font-family: "Source Sans Pro", system-ui, sans-serif; max-width: 760px; margin: 0 auto; padding: 2rem 1rem; color: #262730; }
    h1 { font-size: 2.2rem; margin-bottom: 0.5rem; }
    h2 { font-size: 1.4rem; font-weight: 600; }
    .control { margin: 1rem 0; }
    .control label { display: block; font-size: 0.9rem; margin-bottom: 0.25rem; }
    #threshold { width: 100%; }
    #map { position: relative; width: 100%; height: 500px; }
    #map canvas { border-radius: 4px; }
    #tooltip { min-height: 1.2rem; font-size: 0.85rem; color: #555; }
    figure { margin: 0; }
    figure img { width: 100%; height: auto; }
    figcaption { font-size: 0.85rem; color: #777; text-align: center; margin-top: 0.4rem; }
  </style>
</head>
<body>
  <h1 id="header"></h1>
  <h2 id="subheader"></h2>

  <div class="control">
    <label for="threshold"><span id="slider-label"></span>: <strong id="threshold-value"></strong></label>
    <input type="range" id="threshold" step="1" />
  </div>
  <h2 id="map-title"></h2>

  <div class="control">
    <label><input type="checkbox" id="show-pumps" /> <span id="checkbox-label"></span></label>
  </div>

  <div id="map"></div>
  <div id="tooltip"></div>
  <p id="caption"></p>

  <h2 id="image-header"></h2>
  <figure>
    <img id="reference-image" alt="" />
    <figcaption id="image-caption"></figcaption>
  </figure>

  <div id="attribution"></div>

  <script>
    const slider = document.getElementById('threshold');
    const checkbox = document.getElementById('show-pumps');
    const text = (id, value) => { document.getElementById(id).textContent = value; };
    let overlay = null;

    function scatterplot(layer) {
      return new deck.ScatterplotLayer({
        id: layer.id,
        data: layer.data,
        getPosition: d => [d.lon, d.lat],
        getFillColor: layer.color,
        getRadius: layer.radius.kind === 'count' ? (d => d.count) : layer.radius.value,
        pickable: true,
      });
    }

    async function refresh(params) {
      const query = new URLSearchParams(params || {});
      const response = await fetch('/api/map?' + query.toString());
      if (!response.ok) {
        text('tooltip', (await response.json()).error);
        return;
      }
      const spec = await response.json();

      text('header', spec.header);
      text('subheader', spec.subheader);
      text('slider-label', spec.slider.label);
      text('threshold-value', spec.slider.value);
      slider.min = spec.slider.min;
      slider.max = spec.slider.max;
      slider.value = spec.slider.value;
      text('map-title', spec.map_title);
      text('checkbox-label', spec.checkbox.label);
      checkbox.checked = spec.checkbox.checked;
      text('caption', spec.caption);
      text('image-header', spec.image.header);
      text('image-caption', spec.image.caption);
      const img = document.getElementById('reference-image');
      img.src = spec.image.url;
      img.alt = spec.image.caption;
      document.getElementById('attribution').innerHTML =
        spec.attribution.map(p => '<p>' + p + '</p>').join('');

      const layers = spec.layers.map(scatterplot);
      if (overlay) {
        overlay.setProps({ layers });
        return;
      }
      overlay = new deck.DeckGL({
        container: 'map',
        map: maplibregl,
        mapStyle: spec.view.map_style,
        initialViewState: {
          latitude: spec.view.latitude,
          longitude: spec.view.longitude,
          zoom: spec.view.zoom,
          pitch: spec.view.pitch,
        },
        controller: true,
        layers,
        onClick: async info => {
          if (!info.coordinate) return;
          const [lon, lat] = info.coordinate;
          const hit = await (await fetch(`/api/query?lat=${lat}&lon=${lon}`)).json();
          text('tooltip', hit
            ? (hit.kind === 'pump' ? 'Water pump' : `${hit.count} deaths`) + ` (${hit.distance_m.toFixed(1)} m away)`
            : '');
        },
      });
    }

    const current = () => ({ threshold: slider.value, show_pumps: checkbox.checked });
    slider.addEventListener('input', () => refresh(current()));
    checkbox.addEventListener('change', () => refresh(current()));
    refresh();
  </script>
</body>
</html>
"#;
